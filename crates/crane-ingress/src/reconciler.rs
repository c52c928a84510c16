//! Server-side apply reconciliation of ingresses
//!
//! The reconciler keeps no state between calls. Every apply submits the
//! complete manifest under one field manager and lets the API server merge
//! it; fields owned by other managers are left alone unless `force` is set.
//! Nothing is retried here.

use std::future::Future;
use std::time::Duration;

use k8s_openapi::api::networking::v1::Ingress;
use kube::api::PatchParams;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crane_common::{Error, IngressConfig};

use crate::manifest::IngressManifest;
use crate::store::IngressStore;

/// Apply settings shared by every call of a reconciler
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplySettings {
    /// Field manager identity claiming the applied fields
    pub field_manager: String,
    /// Take ownership of fields held by other managers
    pub force: bool,
    /// Deadline for each remote call
    pub timeout: Duration,
}

impl ApplySettings {
    /// Settings from process configuration
    pub fn from_config(config: &IngressConfig) -> Self {
        Self {
            field_manager: config.field_manager.clone(),
            force: config.force_on_conflicts,
            timeout: config.request_timeout(),
        }
    }

    /// Patch parameters for server-side apply
    pub fn patch_params(&self) -> PatchParams {
        let params = PatchParams::apply(&self.field_manager);
        if self.force {
            params.force()
        } else {
            params
        }
    }
}

/// Applies and deletes ingresses through an [`IngressStore`]
pub struct Reconciler<S> {
    store: S,
    settings: ApplySettings,
}

impl<S: IngressStore> Reconciler<S> {
    /// Create a reconciler over a store
    pub fn new(store: S, settings: ApplySettings) -> Self {
        Self { store, settings }
    }

    /// Settings used for every call
    pub fn settings(&self) -> &ApplySettings {
        &self.settings
    }

    /// Server-side apply a manifest, returning the object as stored
    #[instrument(
        skip(self, manifest, cancel),
        fields(
            namespace = %manifest.namespace(),
            name = %manifest.name(),
            field_manager = %self.settings.field_manager,
            force = self.settings.force,
        )
    )]
    pub async fn apply(
        &self,
        manifest: &IngressManifest,
        cancel: &CancellationToken,
    ) -> Result<Ingress, Error> {
        let (namespace, name) = (manifest.namespace(), manifest.name());
        let params = self.settings.patch_params();

        debug!("applying ingress");
        let result = self
            .guarded(
                "apply",
                namespace,
                name,
                cancel,
                self.store
                    .apply(namespace, name, manifest.as_ingress(), &params),
            )
            .await;

        match &result {
            Ok(_) => info!("ingress applied"),
            Err(e) if e.is_conflict() => {
                warn!(error = %e, "ingress apply conflicts with another field manager")
            }
            Err(e) => error!(error = %e, "ingress apply failed"),
        }
        result
    }

    /// Delete an ingress
    ///
    /// A missing ingress is returned as [`Error::NotFound`]; callers decide
    /// whether that counts as success.
    #[instrument(skip(self, cancel))]
    pub async fn delete(
        &self,
        namespace: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        debug!("deleting ingress");
        let result = self
            .guarded(
                "delete",
                namespace,
                name,
                cancel,
                self.store.delete(namespace, name),
            )
            .await;

        match &result {
            Ok(()) => info!("ingress deleted"),
            Err(e) if e.is_not_found() => debug!("ingress not found"),
            Err(e) => error!(error = %e, "ingress delete failed"),
        }
        result
    }

    /// Run a store call under the caller's cancellation token and the deadline
    async fn guarded<T>(
        &self,
        operation: &str,
        namespace: &str,
        name: &str,
        cancel: &CancellationToken,
        call: impl Future<Output = Result<T, Error>>,
    ) -> Result<T, Error> {
        if cancel.is_cancelled() {
            return Err(Error::cancelled(operation, namespace, name));
        }
        let timeout = self.settings.timeout;
        tokio::select! {
            _ = cancel.cancelled() => Err(Error::cancelled(operation, namespace, name)),
            outcome = tokio::time::timeout(timeout, call) => match outcome {
                Ok(result) => result,
                Err(_) => Err(Error::deadline_exceeded(operation, namespace, name, timeout)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::manifest::assemble;
    use crate::route::ResolvedRoute;
    use crate::store::MockIngressStore;

    fn settings(force: bool) -> ApplySettings {
        ApplySettings {
            field_manager: "crane-test".to_string(),
            force,
            timeout: Duration::from_secs(5),
        }
    }

    fn manifest() -> IngressManifest {
        let route = ResolvedRoute {
            host: "web.apps.example.com".to_string(),
            path: "/".to_string(),
            backend_name: "web".to_string(),
            backend_port: 8080,
        };
        assemble("web", "apps", &route, None, &BTreeMap::new(), &BTreeMap::new())
    }

    // =========================================================================
    // Story: Apply parameters
    // =========================================================================

    #[test]
    fn story_patch_params_carry_manager_and_force() {
        let forced = settings(true).patch_params();
        assert_eq!(forced.field_manager.as_deref(), Some("crane-test"));
        assert!(forced.force);

        let polite = settings(false).patch_params();
        assert!(!polite.force);
    }

    #[test]
    fn story_settings_from_config() {
        let config = IngressConfig {
            field_manager: "ops".to_string(),
            force_on_conflicts: false,
            request_timeout_secs: 12,
            ..Default::default()
        };
        let settings = ApplySettings::from_config(&config);
        assert_eq!(settings.field_manager, "ops");
        assert!(!settings.force);
        assert_eq!(settings.timeout, Duration::from_secs(12));
    }

    // =========================================================================
    // Story: Apply
    // =========================================================================

    #[tokio::test]
    async fn story_apply_submits_full_manifest() {
        let expected = manifest();
        let submitted = expected.as_ingress().clone();

        let mut store = MockIngressStore::new();
        store
            .expect_apply()
            .withf(move |ns, name, ingress, params| {
                ns == "apps"
                    && name == "web"
                    && *ingress == submitted
                    && params.field_manager.as_deref() == Some("crane-test")
                    && params.force
            })
            .times(1)
            .returning(|_, _, ingress, _| Ok(ingress.clone()));

        let reconciler = Reconciler::new(store, settings(true));
        let stored = reconciler
            .apply(&expected, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(stored.metadata.name.as_deref(), Some("web"));
    }

    #[tokio::test]
    async fn story_apply_conflict_is_surfaced_once() {
        let mut store = MockIngressStore::new();
        store
            .expect_apply()
            .times(1)
            .returning(|ns, name, _, _| Err(Error::conflict(ns, name, "conflict with \"kubectl\"")));

        let reconciler = Reconciler::new(store, settings(false));
        let err = reconciler
            .apply(&manifest(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn story_apply_acquisition_failure_is_typed() {
        let mut store = MockIngressStore::new();
        store
            .expect_apply()
            .returning(|_, _, _, _| Err(Error::client_acquisition("no kubeconfig")));

        let reconciler = Reconciler::new(store, settings(true));
        let err = reconciler
            .apply(&manifest(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ClientAcquisition { .. }));
    }

    // =========================================================================
    // Story: Delete
    // =========================================================================

    #[tokio::test]
    async fn story_delete_not_found_is_not_masked() {
        let mut store = MockIngressStore::new();
        store
            .expect_delete()
            .withf(|ns, name| ns == "apps" && name == "web")
            .times(1)
            .returning(|ns, name| Err(Error::not_found(ns, name)));

        let reconciler = Reconciler::new(store, settings(true));
        let err = reconciler
            .delete("apps", "web", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn story_delete_acquisition_failure_is_returned_not_panicked() {
        let mut store = MockIngressStore::new();
        store
            .expect_delete()
            .returning(|_, _| Err(Error::client_acquisition("connection refused")));

        let reconciler = Reconciler::new(store, settings(true));
        let err = reconciler
            .delete("apps", "web", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ClientAcquisition { .. }));
    }

    #[tokio::test]
    async fn story_delete_succeeds() {
        let mut store = MockIngressStore::new();
        store.expect_delete().times(1).returning(|_, _| Ok(()));

        let reconciler = Reconciler::new(store, settings(true));
        reconciler
            .delete("apps", "web", &CancellationToken::new())
            .await
            .unwrap();
    }

    // =========================================================================
    // Story: Cancellation and deadlines
    // =========================================================================

    #[tokio::test]
    async fn story_cancelled_token_skips_remote_call() {
        let mut store = MockIngressStore::new();
        store.expect_apply().never();
        store.expect_delete().never();

        let reconciler = Reconciler::new(store, settings(true));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = reconciler.apply(&manifest(), &cancel).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled { ref operation, .. } if operation == "apply"));

        let err = reconciler.delete("apps", "web", &cancel).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled { ref operation, .. } if operation == "delete"));
    }

    struct SlowStore;

    #[async_trait::async_trait]
    impl IngressStore for SlowStore {
        async fn apply(
            &self,
            _namespace: &str,
            _name: &str,
            ingress: &Ingress,
            _params: &PatchParams,
        ) -> Result<Ingress, Error> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ingress.clone())
        }

        async fn delete(&self, _namespace: &str, _name: &str) -> Result<(), Error> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn story_slow_store_hits_deadline() {
        let reconciler = Reconciler::new(SlowStore, settings(true));
        let err = reconciler
            .apply(&manifest(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DeadlineExceeded { timeout, .. } if timeout == Duration::from_secs(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn story_cancel_during_call_interrupts_it() {
        let reconciler = Reconciler::new(SlowStore, settings(true));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let err = reconciler.delete("apps", "web", &cancel).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled { .. }));
    }
}
