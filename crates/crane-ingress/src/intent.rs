//! Deploy intent: the input to ingress synthesis

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crane_common::Error;

/// Ingress controller implementation that will interpret the annotations
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ControllerFlavor {
    /// ingress-nginx dialect
    #[default]
    #[serde(alias = "nginx")]
    Standard,
    /// Traefik dialect
    #[serde(alias = "traefik")]
    Alternative,
}

/// High-level description of how a container should be exposed
///
/// Empty strings in optional fields are treated as absent.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeployIntent {
    /// Target namespace
    pub namespace: String,
    /// Container (and backing service) name; also the ingress name
    pub container_name: String,
    /// Subdomain label used in front of the routing root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_name: Option<String>,
    /// Routing root overriding the configured root domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_host: Option<String>,
    /// Exposed ports; only the first one is routed
    #[serde(default)]
    pub ports: Vec<u16>,
    /// Request TLS termination with an issued certificate
    #[serde(default)]
    pub tls: bool,
    /// Allow standard forwarding headers through CORS and enable buffering
    #[serde(default)]
    pub proxy_headers: bool,
    /// Extra headers for the CORS allow-list, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_headers: Vec<String>,
    /// Maximum request body size, passed through verbatim (e.g. "32m")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_limit: Option<String>,
    /// Labels for the ingress object
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Annotations overriding the generated ones
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// Controller dialect for generated annotations
    #[serde(default)]
    pub controller_flavor: ControllerFlavor,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl DeployIntent {
    /// Minimal intent for a container in a namespace
    pub fn new(namespace: impl Into<String>, container_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            container_name: container_name.into(),
            ..Default::default()
        }
    }

    /// Subdomain label, if one was given
    pub fn ingress_name(&self) -> Option<&str> {
        non_empty(&self.ingress_name)
    }

    /// Routing root override, if one was given
    pub fn ingress_host(&self) -> Option<&str> {
        non_empty(&self.ingress_host)
    }

    /// Upload limit, if one was given
    pub fn upload_limit(&self) -> Option<&str> {
        non_empty(&self.upload_limit)
    }

    /// Port the backend is reached on
    pub fn backend_port(&self) -> Result<u16, Error> {
        self.ports
            .first()
            .copied()
            .ok_or_else(|| Error::empty_ports(&self.container_name))
    }

    /// Check the intent before any resolution happens
    pub fn validate(&self) -> Result<(), Error> {
        if self.namespace.is_empty() {
            return Err(Error::configuration_for_field(
                "namespace",
                "namespace must not be empty",
            ));
        }
        if self.container_name.is_empty() {
            return Err(Error::configuration_for_field(
                "containerName",
                "container name must not be empty",
            ));
        }
        if self.ports.is_empty() {
            return Err(Error::empty_ports(&self.container_name));
        }
        if self.ports.contains(&0) {
            return Err(Error::configuration_for_field(
                "ports",
                format!("port 0 is not a valid port for {}", self.container_name),
            ));
        }
        Ok(())
    }

    /// Parse an intent from YAML (JSON is accepted too)
    pub fn from_yaml(input: &str) -> Result<Self, Error> {
        serde_yaml::from_str(input)
            .map_err(|e| Error::serialization(format!("invalid deploy intent: {}", e)))
    }
}
