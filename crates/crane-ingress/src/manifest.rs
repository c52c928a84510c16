//! Ingress manifest assembly
//!
//! Composes a resolved route, optional TLS binding, annotations and labels
//! into a `networking.k8s.io/v1` Ingress. Assembly is pure; the result is
//! read-only and handed to the reconciler as a whole.

use std::collections::BTreeMap;

use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, IngressTLS, ServiceBackendPort,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crane_common::Error;

use crate::annotations::AnnotationSet;
use crate::route::{ResolvedRoute, PATH_TYPE};
use crate::tls::TlsBinding;

/// API version of generated ingresses
pub const INGRESS_API_VERSION: &str = "networking.k8s.io/v1";
/// Kind of generated ingresses
pub const INGRESS_KIND: &str = "Ingress";

/// A fully assembled ingress, ready for server-side apply
#[derive(Clone, Debug, PartialEq)]
pub struct IngressManifest {
    ingress: Ingress,
}

impl IngressManifest {
    /// Ingress name
    pub fn name(&self) -> &str {
        self.ingress.metadata.name.as_deref().unwrap_or_default()
    }

    /// Ingress namespace
    pub fn namespace(&self) -> &str {
        self.ingress.metadata.namespace.as_deref().unwrap_or_default()
    }

    /// Annotations on the ingress
    pub fn annotations(&self) -> Option<&BTreeMap<String, String>> {
        self.ingress.metadata.annotations.as_ref()
    }

    /// Host of the single routing rule
    pub fn host(&self) -> Option<&str> {
        self.rule().and_then(|r| r.host.as_deref())
    }

    /// TLS block, if TLS was requested
    pub fn tls(&self) -> Option<&IngressTLS> {
        self.ingress
            .spec
            .as_ref()
            .and_then(|s| s.tls.as_ref())
            .and_then(|t| t.first())
    }

    /// The single routing rule
    pub fn rule(&self) -> Option<&IngressRule> {
        self.ingress
            .spec
            .as_ref()
            .and_then(|s| s.rules.as_ref())
            .and_then(|r| r.first())
    }

    /// Borrow the underlying ingress
    pub fn as_ingress(&self) -> &Ingress {
        &self.ingress
    }

    /// Take the underlying ingress
    pub fn into_inner(self) -> Ingress {
        self.ingress
    }

    /// Render as YAML with apiVersion and kind
    pub fn to_yaml(&self) -> Result<String, Error> {
        serde_yaml::to_string(&self.ingress)
            .map_err(|e| Error::serialization(format!("{}: {}", INGRESS_KIND, e)))
    }

    /// Render as a JSON value with apiVersion and kind
    pub fn to_json(&self) -> Result<serde_json::Value, Error> {
        serde_json::to_value(&self.ingress)
            .map_err(|e| Error::serialization(format!("{}: {}", INGRESS_KIND, e)))
    }
}

/// Compose an ingress named after its container
///
/// Annotations and labels are copied as given.
pub fn assemble(
    container: &str,
    namespace: &str,
    route: &ResolvedRoute,
    tls: Option<&TlsBinding>,
    annotations: &AnnotationSet,
    labels: &BTreeMap<String, String>,
) -> IngressManifest {
    let backend = IngressBackend {
        service: Some(IngressServiceBackend {
            name: route.backend_name.clone(),
            port: Some(ServiceBackendPort {
                number: Some(i32::from(route.backend_port)),
                ..Default::default()
            }),
        }),
        ..Default::default()
    };

    let rule = IngressRule {
        host: Some(route.host.clone()),
        http: Some(HTTPIngressRuleValue {
            paths: vec![HTTPIngressPath {
                path: Some(route.path.clone()),
                path_type: PATH_TYPE.to_string(),
                backend,
            }],
        }),
    };

    let tls = tls.map(|binding| {
        vec![IngressTLS {
            hosts: Some(binding.hosts.clone()),
            secret_name: Some(binding.secret_name.clone()),
        }]
    });

    IngressManifest {
        ingress: Ingress {
            metadata: ObjectMeta {
                name: Some(container.to_string()),
                namespace: Some(namespace.to_string()),
                labels: Some(labels.clone()),
                annotations: Some(annotations.clone()),
                ..Default::default()
            },
            spec: Some(IngressSpec {
                rules: Some(vec![rule]),
                tls,
                ..Default::default()
            }),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tls::tls_binding;

    fn route() -> ResolvedRoute {
        ResolvedRoute {
            host: "web.apps.example.com".to_string(),
            path: "/".to_string(),
            backend_name: "web".to_string(),
            backend_port: 8080,
        }
    }

    fn annotations() -> AnnotationSet {
        [("kubernetes.io/ingress.class", "nginx"), ("x/y", "z")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn story_assembles_single_rule_to_backend() {
        let manifest = assemble("web", "apps", &route(), None, &annotations(), &BTreeMap::new());

        assert_eq!(manifest.name(), "web");
        assert_eq!(manifest.namespace(), "apps");
        assert_eq!(manifest.host(), Some("web.apps.example.com"));

        let rule = manifest.rule().expect("should have rule");
        let path = &rule.http.as_ref().expect("should have http").paths[0];
        assert_eq!(path.path.as_deref(), Some("/"));
        assert_eq!(path.path_type, "ImplementationSpecific");

        let service = path.backend.service.as_ref().expect("should have service");
        assert_eq!(service.name, "web");
        assert_eq!(service.port.as_ref().and_then(|p| p.number), Some(8080));
    }

    #[test]
    fn story_preserves_annotations_and_labels_exactly() {
        let mut labels = BTreeMap::new();
        labels.insert("team".to_string(), "store".to_string());

        let manifest = assemble("web", "apps", &route(), None, &annotations(), &labels);
        assert_eq!(manifest.annotations(), Some(&annotations()));
        assert_eq!(manifest.as_ingress().metadata.labels.as_ref(), Some(&labels));
    }

    #[test]
    fn story_tls_block_follows_binding() {
        let binding = tls_binding("web.apps.example.com", "web", true);
        let manifest = assemble(
            "web",
            "apps",
            &route(),
            binding.as_ref(),
            &annotations(),
            &BTreeMap::new(),
        );

        let tls = manifest.tls().expect("should have tls");
        assert_eq!(tls.secret_name.as_deref(), Some("web-tls"));
        assert_eq!(
            tls.hosts.as_deref(),
            Some(&["web.apps.example.com".to_string()][..])
        );

        let plain = assemble("web", "apps", &route(), None, &annotations(), &BTreeMap::new());
        assert!(plain.tls().is_none());
        assert!(plain.as_ingress().spec.as_ref().unwrap().tls.is_none());
    }

    #[test]
    fn story_serializes_with_type_meta() {
        let manifest = assemble("web", "apps", &route(), None, &annotations(), &BTreeMap::new());
        let json = manifest.to_json().unwrap();
        assert_eq!(json["apiVersion"], INGRESS_API_VERSION);
        assert_eq!(json["kind"], INGRESS_KIND);
        assert_eq!(json["metadata"]["name"], "web");
        assert_eq!(
            json["spec"]["rules"][0]["http"]["paths"][0]["backend"]["service"]["port"]["number"],
            8080
        );

        let yaml = manifest.to_yaml().unwrap();
        assert!(yaml.contains("kind: Ingress"));
    }
}
