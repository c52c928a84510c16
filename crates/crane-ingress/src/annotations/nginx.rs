//! ingress-nginx annotation dialect

use super::{
    AnnotationDefaults, AnnotationPolicy, AnnotationSet, HeaderPolicy, CLUSTER_ISSUER,
    INGRESS_CLASS, TLS_ACME,
};

/// Enables CORS handling
pub const ENABLE_CORS: &str = "nginx.ingress.kubernetes.io/enable-cors";
/// Comma-separated CORS allow-list
pub const CORS_ALLOW_HEADERS: &str = "nginx.ingress.kubernetes.io/cors-allow-headers";
/// Response buffering switch
pub const PROXY_BUFFERING: &str = "nginx.ingress.kubernetes.io/proxy-buffering";
/// Response buffer size
pub const PROXY_BUFFER_SIZE: &str = "nginx.ingress.kubernetes.io/proxy-buffer-size";
/// Maximum request body size
pub const PROXY_BODY_SIZE: &str = "nginx.ingress.kubernetes.io/proxy-body-size";

/// Headers added to the allow-list when proxy headers are requested
pub const FORWARDING_HEADERS: [&str; 5] = [
    "X-Forwarded-For",
    "X-Forwarded-Host",
    "X-Forwarded-Server",
    "X-Real-IP",
    "X-Requested-With",
];

const BUFFER_SIZE: &str = "256k";

/// Standard flavor: ingress-nginx
#[derive(Clone, Copy, Debug, Default)]
pub struct NginxPolicy;

impl AnnotationPolicy for NginxPolicy {
    fn annotations(&self, policy: &HeaderPolicy, defaults: &AnnotationDefaults) -> AnnotationSet {
        let mut annotations = AnnotationSet::new();
        annotations.insert(INGRESS_CLASS.to_string(), defaults.ingress_class.clone());

        if policy.tls {
            annotations.insert(TLS_ACME.to_string(), true.to_string());
            annotations.insert(CLUSTER_ISSUER.to_string(), defaults.cluster_issuer.clone());
        }

        let mut headers = policy.allowed_headers.clone();
        if policy.proxy_headers {
            headers.extend(FORWARDING_HEADERS.iter().map(|h| h.to_string()));
            annotations.insert(ENABLE_CORS.to_string(), true.to_string());
            annotations.insert(PROXY_BUFFERING.to_string(), "on".to_string());
            annotations.insert(PROXY_BUFFER_SIZE.to_string(), BUFFER_SIZE.to_string());
        }

        if !headers.is_empty() {
            annotations.insert(CORS_ALLOW_HEADERS.to_string(), headers.join(", "));
        }

        if let Some(limit) = policy.upload_limit.as_deref().filter(|l| !l.is_empty()) {
            annotations.insert(PROXY_BODY_SIZE.to_string(), limit.to_string());
        }

        annotations
    }
}
