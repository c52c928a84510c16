//! Ingress store: the cluster boundary
//!
//! [`IngressStore`] is the seam between the reconciler and the API server.
//! [`KubeIngressStore`] implements it with kube-rs; tests substitute mocks
//! or an in-memory apply simulator.

use async_trait::async_trait;
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{Api, DeleteParams, Patch, PatchParams};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crane_common::kube_utils::ClientProvider;
use crane_common::Error;

/// HTTP status the API server returns for a field manager conflict
pub const STATUS_CONFLICT: u16 = 409;
/// HTTP status the API server returns for a missing object
pub const STATUS_NOT_FOUND: u16 = 404;

/// Trait abstracting ingress write operations against a cluster
///
/// Implementations classify failures: ownership conflicts as
/// [`Error::Conflict`], missing objects on delete as [`Error::NotFound`],
/// client construction as [`Error::ClientAcquisition`] and everything else
/// as [`Error::Remote`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IngressStore: Send + Sync {
    /// Server-side apply an ingress
    ///
    /// # Arguments
    ///
    /// * `namespace` - Namespace of the ingress
    /// * `name` - Name of the ingress
    /// * `ingress` - Complete desired state
    /// * `params` - Field manager and force flag
    async fn apply(
        &self,
        namespace: &str,
        name: &str,
        ingress: &Ingress,
        params: &PatchParams,
    ) -> Result<Ingress, Error>;

    /// Delete an ingress by namespace and name
    async fn delete(&self, namespace: &str, name: &str) -> Result<(), Error>;
}

/// Map a kube error from an apply call
pub fn classify_apply_error(namespace: &str, name: &str, err: kube::Error) -> Error {
    match err {
        kube::Error::Api(ae) if ae.code == STATUS_CONFLICT => {
            Error::conflict(namespace, name, ae.message)
        }
        other => Error::remote("apply", namespace, name, other),
    }
}

/// Map a kube error from a delete call
pub fn classify_delete_error(namespace: &str, name: &str, err: kube::Error) -> Error {
    match err {
        kube::Error::Api(ae) if ae.code == STATUS_NOT_FOUND => Error::not_found(namespace, name),
        other => Error::remote("delete", namespace, name, other),
    }
}

/// Ingress store backed by the Kubernetes API
pub struct KubeIngressStore<P> {
    clients: P,
}

impl<P: ClientProvider> KubeIngressStore<P> {
    /// Create a store acquiring clients from `clients` on every call
    pub fn new(clients: P) -> Self {
        Self { clients }
    }

    async fn api(&self, namespace: &str) -> Result<Api<Ingress>, Error> {
        let client = self.clients.acquire().await?;
        Ok(Api::namespaced(client, namespace))
    }
}

#[async_trait]
impl<P: ClientProvider> IngressStore for KubeIngressStore<P> {
    async fn apply(
        &self,
        namespace: &str,
        name: &str,
        ingress: &Ingress,
        params: &PatchParams,
    ) -> Result<Ingress, Error> {
        let api = self.api(namespace).await?;
        debug!(namespace, name, "patching ingress");
        api.patch(name, params, &Patch::Apply(ingress))
            .await
            .map_err(|e| classify_apply_error(namespace, name, e))
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), Error> {
        let api = self.api(namespace).await?;
        debug!(namespace, name, "deleting ingress");
        api.delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| classify_delete_error(namespace, name, e))
    }
}
