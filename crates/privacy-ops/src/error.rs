//! Error types for the privacy-ops client.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort provisioning.
#[derive(Debug, Error)]
pub enum PrivacyOpsError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{operation} failed: status={status}, body={body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The service answered with success but the payload was unusable.
    #[error("{operation} returned an unexpected response: {detail}")]
    UnexpectedResponse {
        operation: &'static str,
        detail: String,
    },

    /// The dataset annotation cannot be traversed from the identity.
    #[error("dataset is not traversable: {0}")]
    NotTraversable(String),

    /// The service never answered its health check.
    #[error("service at {url} was not healthy within {seconds}s")]
    Unhealthy { url: String, seconds: u64 },

    /// Reading the dataset file failed.
    #[error("failed to read dataset {path}: {source}")]
    DatasetIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The dataset file is not valid YAML or has no `dataset` entries.
    #[error("invalid dataset {path}: {detail}")]
    DatasetInvalid { path: PathBuf, detail: String },

    /// The result file did not appear before the deadline.
    #[error("privacy request results were not uploaded to {0}")]
    ResultsTimeout(PathBuf),

    /// The result file was not valid JSON.
    #[error("invalid results file {path}: {source}")]
    ResultsInvalid {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Reading the result file or the terminal failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result alias for privacy-ops operations.
pub type Result<T> = std::result::Result<T, PrivacyOpsError>;
