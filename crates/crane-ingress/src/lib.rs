//! Ingress synthesis and reconciliation for crane deployments
//!
//! Turns a [`DeployIntent`] into a `networking.k8s.io/v1` Ingress and keeps
//! it in the cluster with server-side apply.
//!
//! # Example
//!
//! ```ignore
//! use crane_common::kube_utils::KubeconfigProvider;
//! use crane_ingress::{DeployIntent, IngressDeployer, KubeIngressStore};
//!
//! let store = KubeIngressStore::new(KubeconfigProvider::new(None));
//! let deployer = IngressDeployer::new(config, store)?;
//! let ingress = deployer.deploy(&intent, &cancel).await?;
//! ```

#![deny(missing_docs)]

pub mod annotations;
pub mod deployer;
pub mod intent;
pub mod manifest;
pub mod reconciler;
pub mod route;
pub mod store;
pub mod tls;

pub use annotations::{AnnotationPolicy, AnnotationSet};
pub use deployer::{render, IngressDeployer};
pub use intent::{ControllerFlavor, DeployIntent};
pub use manifest::IngressManifest;
pub use reconciler::{ApplySettings, Reconciler};
pub use store::{IngressStore, KubeIngressStore};
