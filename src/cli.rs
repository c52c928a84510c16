//! Command-line interface for crane-ingress

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crane_common::config::{load_config_file, IngressConfig};
use crane_common::Error;

/// crane-ingress - synthesize and apply ingresses for crane deployments
#[derive(Parser, Debug)]
#[command(name = "crane-ingress", version, about, long_about = None)]
pub struct Cli {
    /// Emit JSON structured logs
    #[arg(long, global = true, env = "CRANE_LOG_JSON")]
    pub log_json: bool,

    /// Path to a kubeconfig file (defaults to in-cluster or ~/.kube/config)
    #[arg(long, global = true, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the ingress for a deploy intent without contacting the cluster
    Render(IntentArgs),

    /// Server-side apply the ingress for a deploy intent
    Apply(IntentArgs),

    /// Delete an ingress
    Delete(DeleteArgs),
}

/// Arguments for commands that read a deploy intent
#[derive(Args, Debug)]
pub struct IntentArgs {
    /// Path to the deploy intent (YAML or JSON)
    #[arg(short = 'f', long = "filename")]
    pub file: PathBuf,
}

/// Arguments for `delete`
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Namespace of the ingress
    #[arg(short = 'n', long)]
    pub namespace: String,

    /// Name of the ingress (the container name)
    #[arg(long)]
    pub name: String,

    /// Treat a missing ingress as success
    #[arg(long)]
    pub ignore_not_found: bool,
}

/// Process-wide ingress settings; flags override the config file
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Path to a YAML config file
    #[arg(long = "config", global = true, env = "CRANE_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// Root domain used when an intent has no ingress host
    #[arg(long, global = true, env = "INGRESS_ROOT_DOMAIN")]
    pub root_domain: Option<String>,

    /// Field manager for server-side apply
    #[arg(long, global = true, env = "FIELD_MANAGER_NAME")]
    pub field_manager: Option<String>,

    /// Take ownership of fields held by other managers
    #[arg(long, global = true, env = "FORCE_ON_CONFLICTS")]
    pub force_on_conflicts: Option<bool>,

    /// cert-manager cluster issuer for TLS ingresses
    #[arg(long, global = true, env = "CLUSTER_ISSUER")]
    pub cluster_issuer: Option<String>,

    /// Deadline for each cluster call in seconds
    #[arg(long, global = true, env = "INGRESS_REQUEST_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

impl ConfigArgs {
    /// Load the config file (if any) and apply flag overrides
    pub fn resolve(&self) -> Result<IngressConfig, Error> {
        let base = match &self.config_file {
            Some(path) => load_config_file::<IngressConfig>(&path.to_string_lossy())?,
            None => IngressConfig::default(),
        };
        Ok(self.apply_overrides(base))
    }

    fn apply_overrides(&self, mut config: IngressConfig) -> IngressConfig {
        if let Some(domain) = &self.root_domain {
            config.root_domain = Some(domain.clone());
        }
        if let Some(manager) = &self.field_manager {
            config.field_manager = manager.clone();
        }
        if let Some(force) = self.force_on_conflicts {
            config.force_on_conflicts = force;
        }
        if let Some(issuer) = &self.cluster_issuer {
            config.cluster_issuer = issuer.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = secs;
        }
        config
    }
}
