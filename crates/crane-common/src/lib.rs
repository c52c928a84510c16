//! Common types for crane: errors, configuration, client acquisition and telemetry

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod kube_utils;
pub mod telemetry;

pub use config::IngressConfig;
pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
