//! Error types for netledger.
//!
//! The ledger itself never fails; these errors come from the layers around
//! it: configuration, capture sources, the service boundary, and export.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for netledger operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Capture Errors ===
    /// A capture source could not be opened or read.
    #[error("capture source '{name}' failed: {message}")]
    CaptureSource {
        /// Name of the capture source.
        name: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// A capture event could not be parsed.
    #[error("invalid capture event on line {line}: {source}")]
    EventParse {
        /// 1-based line number in the event stream.
        line: usize,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A stringified request status was not `Pending`, `ERROR`, or a code.
    #[error("invalid request status: {value:?}")]
    InvalidStatus {
        /// The rejected text.
        value: String,
    },

    // === Service Errors ===
    /// The ledger service has stopped and can no longer answer requests.
    #[error("ledger service is not running")]
    ServiceClosed,

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for netledger operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a capture source error.
    #[must_use]
    pub fn capture_source(name: &'static str, message: impl Into<String>) -> Self {
        Self::CaptureSource {
            name,
            message: message.into(),
        }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error means the ledger service has stopped.
    #[must_use]
    pub fn is_service_closed(&self) -> bool {
        matches!(self, Self::ServiceClosed)
    }
}
