//! Process-wide ingress configuration
//!
//! Values here are injected into the ingress engine at call time. Nothing in
//! the engine reads the environment directly.
//!
//! Example `config.yaml`:
//! ```yaml
//! root-domain: apps.example.com
//! field-manager: crane-dyrector-io
//! force-on-conflicts: true
//! cluster-issuer: letsencrypt-prod
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Default field manager identity for server-side apply
pub const DEFAULT_FIELD_MANAGER: &str = "crane-dyrector-io";

/// Default cert-manager cluster issuer
pub const DEFAULT_CLUSTER_ISSUER: &str = "letsencrypt-prod";

/// Default ingress class for the ingress-nginx dialect
pub const DEFAULT_STANDARD_INGRESS_CLASS: &str = "nginx";

/// Default ingress class for the Traefik dialect
pub const DEFAULT_ALTERNATIVE_INGRESS_CLASS: &str = "traefik";

/// Default deadline for a single apply or delete call
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration consumed by the ingress engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct IngressConfig {
    /// Root domain used when a deploy request carries no ingress host
    pub root_domain: Option<String>,
    /// Field manager identity for server-side apply
    pub field_manager: String,
    /// Take ownership of conflicting fields instead of failing
    pub force_on_conflicts: bool,
    /// cert-manager cluster issuer referenced by TLS annotations
    pub cluster_issuer: String,
    /// Ingress class written for the Standard (ingress-nginx) flavor
    pub standard_ingress_class: String,
    /// Ingress class written for the Alternative (Traefik) flavor
    pub alternative_ingress_class: String,
    /// Deadline in seconds for each remote call
    pub request_timeout_secs: u64,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            root_domain: None,
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            force_on_conflicts: true,
            cluster_issuer: DEFAULT_CLUSTER_ISSUER.to_string(),
            standard_ingress_class: DEFAULT_STANDARD_INGRESS_CLASS.to_string(),
            alternative_ingress_class: DEFAULT_ALTERNATIVE_INGRESS_CLASS.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl IngressConfig {
    /// Root domain, treating an empty string as unset
    pub fn root_domain(&self) -> Option<&str> {
        self.root_domain.as_deref().filter(|d| !d.is_empty())
    }

    /// Deadline applied to each remote call
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Reject settings the reconciler cannot work with
    pub fn validate(&self) -> Result<(), Error> {
        if self.field_manager.trim().is_empty() {
            return Err(Error::configuration_for_field(
                "field-manager",
                "field manager must not be empty",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::configuration_for_field(
                "request-timeout-secs",
                "request timeout must be greater than zero",
            ));
        }
        for (field, value) in [
            ("cluster-issuer", &self.cluster_issuer),
            ("standard-ingress-class", &self.standard_ingress_class),
            ("alternative-ingress-class", &self.alternative_ingress_class),
        ] {
            if value.is_empty() {
                return Err(Error::configuration_for_field(
                    field,
                    format!("{} must not be empty", field),
                ));
            }
        }
        Ok(())
    }
}

/// Load a YAML config file, returning the default if the file doesn't exist.
pub fn load_config_file<T: serde::de::DeserializeOwned + Default>(path: &str) -> Result<T, Error> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => {
            return Err(Error::configuration(format!(
                "failed to read config file {}: {}",
                path, e
            )))
        }
    };
    serde_yaml::from_str(&content)
        .map_err(|e| Error::serialization(format!("invalid config file {}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_crane() {
        let config = IngressConfig::default();
        assert_eq!(config.field_manager, "crane-dyrector-io");
        assert!(config.force_on_conflicts);
        assert_eq!(config.cluster_issuer, "letsencrypt-prod");
        assert_eq!(config.standard_ingress_class, "nginx");
        assert_eq!(config.alternative_ingress_class, "traefik");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_root_domain_is_unset() {
        let config = IngressConfig {
            root_domain: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(config.root_domain(), None);
    }

    #[test]
    fn parses_partial_yaml() {
        let config: IngressConfig =
            serde_yaml::from_str("root-domain: apps.example.com\nforce-on-conflicts: false\n")
                .unwrap();
        assert_eq!(config.root_domain(), Some("apps.example.com"));
        assert!(!config.force_on_conflicts);
        assert_eq!(config.field_manager, DEFAULT_FIELD_MANAGER);
    }

    #[test]
    fn validate_rejects_empty_field_manager() {
        let config = IngressConfig {
            field_manager: " ".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let config = IngressConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_yields_default() {
        let config: IngressConfig =
            load_config_file("/nonexistent/crane/config.yaml").unwrap();
        assert_eq!(config, IngressConfig::default());
    }
}
