//! Controller-specific ingress annotations
//!
//! Each ingress controller reads its own private annotation dialect. A
//! dialect is an [`AnnotationPolicy`]; [`ControllerFlavor`] picks one. The
//! generated set is then overlaid with the caller's annotations, which win
//! on every key collision.
//!
//! # Overview
//!
//! | Flavor      | Controller    | Supports CORS / buffering / body size |
//! |-------------|---------------|---------------------------------------|
//! | Standard    | ingress-nginx | yes                                   |
//! | Alternative | Traefik       | no (flags are ignored)                |

pub mod nginx;
pub mod traefik;

use std::collections::BTreeMap;

use crane_common::IngressConfig;

use crate::intent::{ControllerFlavor, DeployIntent};

pub use nginx::NginxPolicy;
pub use traefik::TraefikPolicy;

/// Flat annotation mapping written to the ingress metadata
pub type AnnotationSet = BTreeMap<String, String>;

/// Legacy ingress class annotation honoured by both controllers
pub const INGRESS_CLASS: &str = "kubernetes.io/ingress.class";
/// Asks cert-manager's ingress-shim to issue a certificate
pub const TLS_ACME: &str = "kubernetes.io/tls-acme";
/// cert-manager cluster issuer reference
pub const CLUSTER_ISSUER: &str = "cert-manager.io/cluster-issuer";

/// Policy flags the dialects translate into annotations
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderPolicy {
    /// TLS termination requested
    pub tls: bool,
    /// Forwarding headers, CORS and buffering requested
    pub proxy_headers: bool,
    /// Extra CORS headers, in order
    pub allowed_headers: Vec<String>,
    /// Request body size limit
    pub upload_limit: Option<String>,
}

impl HeaderPolicy {
    /// Extract the policy flags from an intent
    pub fn from_intent(intent: &DeployIntent) -> Self {
        Self {
            tls: intent.tls,
            proxy_headers: intent.proxy_headers,
            allowed_headers: intent.allowed_headers.clone(),
            upload_limit: intent.upload_limit().map(str::to_string),
        }
    }
}

/// Values a dialect needs that come from configuration, not the intent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationDefaults {
    /// Ingress class the controller watches
    pub ingress_class: String,
    /// cert-manager cluster issuer for TLS
    pub cluster_issuer: String,
}

/// Translates policy flags into one controller's annotation dialect
///
/// Implementations are pure: the same inputs always give the same set.
pub trait AnnotationPolicy: Send + Sync {
    /// Annotation set for the given policy
    fn annotations(&self, policy: &HeaderPolicy, defaults: &AnnotationDefaults) -> AnnotationSet;
}

impl ControllerFlavor {
    /// Annotation dialect for this flavor
    pub fn policy(self) -> &'static dyn AnnotationPolicy {
        match self {
            ControllerFlavor::Standard => &NginxPolicy,
            ControllerFlavor::Alternative => &TraefikPolicy,
        }
    }

    /// Defaults for this flavor taken from configuration
    pub fn defaults(self, config: &IngressConfig) -> AnnotationDefaults {
        let ingress_class = match self {
            ControllerFlavor::Standard => &config.standard_ingress_class,
            ControllerFlavor::Alternative => &config.alternative_ingress_class,
        };
        AnnotationDefaults {
            ingress_class: ingress_class.clone(),
            cluster_issuer: config.cluster_issuer.clone(),
        }
    }
}

/// Overlay caller annotations onto a generated set
///
/// Returns a new map; caller values replace generated ones key-by-key.
pub fn merge_overrides(
    generated: &AnnotationSet,
    overrides: &BTreeMap<String, String>,
) -> AnnotationSet {
    let mut merged = generated.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Final annotation set for an intent: flavor dialect plus caller overrides
pub fn build_annotations(intent: &DeployIntent, config: &IngressConfig) -> AnnotationSet {
    let flavor = intent.controller_flavor;
    let generated = flavor
        .policy()
        .annotations(&HeaderPolicy::from_intent(intent), &flavor.defaults(config));
    merge_overrides(&generated, &intent.annotations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, &str)]) -> AnnotationSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn story_user_value_wins_on_collision() {
        let generated = set(&[(CLUSTER_ISSUER, "letsencrypt-prod"), (TLS_ACME, "true")]);
        let overrides = set(&[(CLUSTER_ISSUER, "letsencrypt-staging"), ("x/extra", "1")]);

        let merged = merge_overrides(&generated, &overrides);
        assert_eq!(merged[CLUSTER_ISSUER], "letsencrypt-staging");
        assert_eq!(merged[TLS_ACME], "true");
        assert_eq!(merged["x/extra"], "1");
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn story_merge_is_idempotent() {
        let generated = set(&[(INGRESS_CLASS, "nginx"), (TLS_ACME, "true")]);
        let overrides = set(&[(INGRESS_CLASS, "internal")]);

        let once = merge_overrides(&generated, &overrides);
        let twice = merge_overrides(&once, &overrides);
        assert_eq!(once, twice);
    }

    #[test]
    fn story_merge_leaves_inputs_untouched() {
        let generated = set(&[(INGRESS_CLASS, "nginx")]);
        let overrides = set(&[(INGRESS_CLASS, "internal")]);
        let _ = merge_overrides(&generated, &overrides);
        assert_eq!(generated[INGRESS_CLASS], "nginx");
    }

    #[test]
    fn story_build_annotations_uses_configured_defaults() {
        let config = IngressConfig {
            cluster_issuer: "corp-ca".to_string(),
            standard_ingress_class: "nginx-internal".to_string(),
            ..Default::default()
        };
        let mut intent = DeployIntent::new("apps", "web");
        intent.tls = true;

        let annotations = build_annotations(&intent, &config);
        assert_eq!(annotations[INGRESS_CLASS], "nginx-internal");
        assert_eq!(annotations[CLUSTER_ISSUER], "corp-ca");
    }

    #[test]
    fn story_build_annotations_applies_overrides_last() {
        let mut intent = DeployIntent::new("apps", "web");
        intent.tls = true;
        intent.controller_flavor = ControllerFlavor::Alternative;
        intent
            .annotations
            .insert(CLUSTER_ISSUER.to_string(), "letsencrypt-staging".to_string());

        let annotations = build_annotations(&intent, &IngressConfig::default());
        assert_eq!(annotations[CLUSTER_ISSUER], "letsencrypt-staging");
        assert_eq!(annotations[INGRESS_CLASS], "traefik");
    }

    #[test]
    fn story_flavor_defaults_pick_matching_class() {
        let config = IngressConfig::default();
        assert_eq!(ControllerFlavor::Standard.defaults(&config).ingress_class, "nginx");
        assert_eq!(
            ControllerFlavor::Alternative.defaults(&config).ingress_class,
            "traefik"
        );
    }
}
