//! Error types for crane ingress operations
//!
//! Errors are structured with fields to aid debugging in production.
//! Variants that touch the cluster carry the ingress namespace and name,
//! plus the operation (apply, delete) that failed.

use std::time::Duration;

use thiserror::Error;

/// Main error type for crane operations
#[derive(Debug, Error)]
pub enum Error {
    /// The deploy intent exposes no ports
    #[error("empty ports for {container}, nothing to expose")]
    EmptyPorts {
        /// Container the ingress was requested for
        container: String,
    },

    /// Neither an ingress host nor a root domain was available
    #[error("no ingress domain provided in deploy request or configuration for {container}")]
    MissingDomain {
        /// Container the ingress was requested for
        container: String,
    },

    /// Invalid configuration or deploy intent
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of what's invalid
        message: String,
        /// The offending field (e.g., "containerName")
        field: Option<String>,
    },

    /// Failed to obtain a working handle to the cluster API
    #[error("client acquisition error: {message}")]
    ClientAcquisition {
        /// Description of what failed
        message: String,
    },

    /// Server-side apply hit a field owned by another manager
    #[error("apply conflict for ingress {namespace}/{name}: {message}")]
    Conflict {
        /// Ingress namespace
        namespace: String,
        /// Ingress name
        name: String,
        /// Conflict details as reported by the API server
        message: String,
    },

    /// The ingress does not exist
    #[error("ingress {namespace}/{name} not found")]
    NotFound {
        /// Ingress namespace
        namespace: String,
        /// Ingress name
        name: String,
    },

    /// Any other failure reported by the API server or transport
    #[error("{operation} of ingress {namespace}/{name} failed: {source}")]
    Remote {
        /// Operation being performed (apply, delete)
        operation: String,
        /// Ingress namespace
        namespace: String,
        /// Ingress name
        name: String,
        /// The underlying kube-rs error
        #[source]
        source: kube::Error,
    },

    /// The caller cancelled the operation
    #[error("{operation} of ingress {namespace}/{name} cancelled")]
    Cancelled {
        /// Operation being performed
        operation: String,
        /// Ingress namespace
        namespace: String,
        /// Ingress name
        name: String,
    },

    /// The operation did not finish before its deadline
    #[error("{operation} of ingress {namespace}/{name} exceeded deadline of {timeout:?}")]
    DeadlineExceeded {
        /// Operation being performed
        operation: String,
        /// Ingress namespace
        namespace: String,
        /// Ingress name
        name: String,
        /// The deadline that elapsed
        timeout: Duration,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create an empty-ports error for a container
    pub fn empty_ports(container: impl Into<String>) -> Self {
        Self::EmptyPorts {
            container: container.into(),
        }
    }

    /// Create a missing-domain error for a container
    pub fn missing_domain(container: impl Into<String>) -> Self {
        Self::MissingDomain {
            container: container.into(),
        }
    }

    /// Create a configuration error with the given message
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a configuration error pointing at a specific field
    pub fn configuration_for_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a client acquisition error
    pub fn client_acquisition(msg: impl Into<String>) -> Self {
        Self::ClientAcquisition {
            message: msg.into(),
        }
    }

    /// Create a conflict error for an ingress
    pub fn conflict(
        namespace: impl Into<String>,
        name: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Conflict {
            namespace: namespace.into(),
            name: name.into(),
            message: msg.into(),
        }
    }

    /// Create a not-found error for an ingress
    pub fn not_found(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Wrap a kube error with operation and resource context
    pub fn remote(
        operation: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
        source: kube::Error,
    ) -> Self {
        Self::Remote {
            operation: operation.into(),
            namespace: namespace.into(),
            name: name.into(),
            source,
        }
    }

    /// Create a cancellation error
    pub fn cancelled(
        operation: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::Cancelled {
            operation: operation.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Create a deadline error
    pub fn deadline_exceeded(
        operation: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self::DeadlineExceeded {
            operation: operation.into(),
            namespace: namespace.into(),
            name: name.into(),
            timeout,
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }

    /// Check if this error is retryable
    ///
    /// Configuration problems need an operator fix. Conflicts need a decision
    /// (retry with force, or alert). Not-found and cancellation are final.
    /// Remote errors are retryable unless the server rejected the request (4xx).
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::EmptyPorts { .. }
            | Error::MissingDomain { .. }
            | Error::Configuration { .. }
            | Error::Serialization { .. } => false,
            Error::Conflict { .. } | Error::NotFound { .. } | Error::Cancelled { .. } => false,
            Error::ClientAcquisition { .. } | Error::DeadlineExceeded { .. } => true,
            Error::Remote { source, .. } => !matches!(
                source,
                kube::Error::Api(ae) if (400..500).contains(&ae.code)
            ),
        }
    }

    /// True for field-ownership conflicts from server-side apply
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }

    /// True when the target ingress did not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True for errors raised before any cluster call was attempted
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::EmptyPorts { .. } | Error::MissingDomain { .. } | Error::Configuration { .. }
        )
    }

    /// Get the `(namespace, name)` of the ingress this error is about, if known
    pub fn resource(&self) -> Option<(&str, &str)> {
        match self {
            Error::Conflict {
                namespace, name, ..
            }
            | Error::NotFound { namespace, name }
            | Error::Remote {
                namespace, name, ..
            }
            | Error::Cancelled {
                namespace, name, ..
            }
            | Error::DeadlineExceeded {
                namespace, name, ..
            } => Some((namespace.as_str(), name.as_str())),
            _ => None,
        }
    }
}
