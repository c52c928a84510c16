//! crane-ingress - ingress synthesis and server-side apply for crane deployments
//!
//! The engine lives in `crane-ingress`; shared errors, configuration and
//! client acquisition in `crane-common`. This crate is the command-line
//! front end.

pub mod cli;

pub use crane_common::{Error, IngressConfig};
pub use crane_ingress::{DeployIntent, IngressDeployer};
