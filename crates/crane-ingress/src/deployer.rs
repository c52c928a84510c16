//! Ingress deployer: intent in, applied ingress out
//!
//! Runs the pipeline intent → route → TLS → annotations → manifest →
//! reconciler. Configuration problems are reported before any cluster call.

use k8s_openapi::api::networking::v1::Ingress;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crane_common::{Error, IngressConfig};

use crate::annotations::build_annotations;
use crate::intent::DeployIntent;
use crate::manifest::{assemble, IngressManifest};
use crate::reconciler::{ApplySettings, Reconciler};
use crate::route::resolve_route;
use crate::store::IngressStore;
use crate::tls::tls_binding;

/// Build the ingress manifest for an intent without touching the cluster
pub fn render(intent: &DeployIntent, config: &IngressConfig) -> Result<IngressManifest, Error> {
    intent.validate()?;

    let route = resolve_route(intent, config.root_domain())?;
    let tls = tls_binding(&route.host, &intent.container_name, intent.tls);
    let annotations = build_annotations(intent, config);

    debug!(
        namespace = %intent.namespace,
        name = %intent.container_name,
        host = %route.host,
        tls = tls.is_some(),
        flavor = ?intent.controller_flavor,
        "rendered ingress"
    );

    Ok(assemble(
        &intent.container_name,
        &intent.namespace,
        &route,
        tls.as_ref(),
        &annotations,
        &intent.labels,
    ))
}

/// Deploys and removes ingresses for crane workloads
pub struct IngressDeployer<S> {
    config: IngressConfig,
    reconciler: Reconciler<S>,
}

impl<S: IngressStore> IngressDeployer<S> {
    /// Create a deployer; the configuration is validated up front
    pub fn new(config: IngressConfig, store: S) -> Result<Self, Error> {
        config.validate()?;
        let reconciler = Reconciler::new(store, ApplySettings::from_config(&config));
        Ok(Self { config, reconciler })
    }

    /// Configuration in use
    pub fn config(&self) -> &IngressConfig {
        &self.config
    }

    /// Build the manifest for an intent (dry run)
    pub fn render(&self, intent: &DeployIntent) -> Result<IngressManifest, Error> {
        render(intent, &self.config)
    }

    /// Build and apply the ingress for an intent
    pub async fn deploy(
        &self,
        intent: &DeployIntent,
        cancel: &CancellationToken,
    ) -> Result<Ingress, Error> {
        let manifest = self.render(intent)?;
        self.reconciler.apply(&manifest, cancel).await
    }

    /// Delete an ingress by namespace and name
    pub async fn remove(
        &self,
        namespace: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        self.reconciler.delete(namespace, name, cancel).await
    }
}
