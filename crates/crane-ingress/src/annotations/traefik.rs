//! Traefik annotation dialect
//!
//! Traefik has no annotation equivalents for the CORS, buffering and body
//! size flags used here, so those are ignored.

use super::{
    AnnotationDefaults, AnnotationPolicy, AnnotationSet, HeaderPolicy, CLUSTER_ISSUER,
    INGRESS_CLASS, TLS_ACME,
};

/// Entrypoints the router listens on
pub const ROUTER_ENTRYPOINTS: &str = "traefik.ingress.kubernetes.io/router.entrypoints";
/// Router-level TLS switch
pub const ROUTER_TLS: &str = "traefik.ingress.kubernetes.io/router.tls";
/// Ingress class cert-manager uses to solve HTTP-01 challenges
pub const HTTP01_INGRESS_CLASS: &str = "acme.cert-manager.io/http01-ingress-class";

/// Alternative flavor: Traefik
#[derive(Clone, Copy, Debug, Default)]
pub struct TraefikPolicy;

impl AnnotationPolicy for TraefikPolicy {
    fn annotations(&self, policy: &HeaderPolicy, defaults: &AnnotationDefaults) -> AnnotationSet {
        let mut annotations = AnnotationSet::new();
        annotations.insert(INGRESS_CLASS.to_string(), defaults.ingress_class.clone());

        if policy.tls {
            annotations.insert(ROUTER_ENTRYPOINTS.to_string(), "web,websecure".to_string());
            annotations.insert(
                HTTP01_INGRESS_CLASS.to_string(),
                defaults.ingress_class.clone(),
            );
            annotations.insert(ROUTER_TLS.to_string(), true.to_string());
            annotations.insert(TLS_ACME.to_string(), true.to_string());
            annotations.insert(CLUSTER_ISSUER.to_string(), defaults.cluster_issuer.clone());
        } else {
            annotations.insert(ROUTER_ENTRYPOINTS.to_string(), "web".to_string());
        }

        annotations
    }
}
