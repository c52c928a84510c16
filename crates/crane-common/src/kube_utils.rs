//! Kubernetes client acquisition using kube-rs
//!
//! Every failure to build a client is reported as
//! [`Error::ClientAcquisition`] so callers can retry or surface it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

use crate::Error;

/// Default connection timeout for kube clients
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default read timeout for kube clients
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Create a kube client from optional kubeconfig path with default timeouts
pub async fn create_client(kubeconfig: Option<&Path>) -> Result<Client, Error> {
    create_client_with_timeout(kubeconfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT).await
}

/// Create a kube client from optional kubeconfig path with custom timeouts
pub async fn create_client_with_timeout(
    kubeconfig: Option<&Path>,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<Client, Error> {
    let mut config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                Error::client_acquisition(format!(
                    "failed to read kubeconfig {}: {}",
                    path.display(),
                    e
                ))
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| {
                    Error::client_acquisition(format!("failed to load kubeconfig: {}", e))
                })?
        }
        None => Config::infer()
            .await
            .map_err(|e| Error::client_acquisition(format!("failed to infer config: {}", e)))?,
    };
    config.connect_timeout = Some(connect_timeout);
    config.read_timeout = Some(read_timeout);
    Client::try_from(config)
        .map_err(|e| Error::client_acquisition(format!("failed to create client: {}", e)))
}

/// Source of kube clients
///
/// Acquisition happens per call so a transient failure surfaces as a typed
/// error on that call instead of at process start.
#[async_trait]
pub trait ClientProvider: Send + Sync {
    /// Obtain a client for the target cluster
    async fn acquire(&self) -> Result<Client, Error>;
}

#[async_trait]
impl ClientProvider for Client {
    async fn acquire(&self) -> Result<Client, Error> {
        Ok(self.clone())
    }
}

/// Builds a client from a kubeconfig (or the inferred environment) on demand
#[derive(Debug, Clone)]
pub struct KubeconfigProvider {
    kubeconfig: Option<PathBuf>,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl KubeconfigProvider {
    /// Provider for an explicit kubeconfig path, or in-cluster/inferred config when `None`
    pub fn new(kubeconfig: Option<PathBuf>) -> Self {
        Self {
            kubeconfig,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Override the read timeout used by acquired clients
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Kubeconfig path this provider reads, if any
    pub fn kubeconfig(&self) -> Option<&Path> {
        self.kubeconfig.as_deref()
    }
}

#[async_trait]
impl ClientProvider for KubeconfigProvider {
    async fn acquire(&self) -> Result<Client, Error> {
        debug!(kubeconfig = ?self.kubeconfig, "acquiring kube client");
        create_client_with_timeout(
            self.kubeconfig.as_deref(),
            self.connect_timeout,
            self.read_timeout,
        )
        .await
    }
}
