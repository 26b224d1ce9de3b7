//! Error types for svc-info
//!
//! Provides structured error types for configuration loading, the
//! management REST client and the category dispatcher.

use thiserror::Error;

/// Unified error type for the information gatherer
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // REST API Errors
    // =========================================================================
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication to {cluster} rejected with HTTP {status}")]
    Authentication { cluster: String, status: u16 },

    #[error("Command {command} failed with HTTP {status}: {body}")]
    CommandFailed {
        command: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected response to {command}: {reason}")]
    UnexpectedResponse { command: String, reason: String },

    // =========================================================================
    // Gather Errors
    // =========================================================================
    #[error("Get {category} from cluster {cluster} failed with error: {source}")]
    GatherFailed {
        category: String,
        cluster: String,
        source: Box<Error>,
    },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error is transient and worth another attempt
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(e) => e.is_connect() || e.is_timeout(),
            Error::CommandFailed { status, .. } => *status >= 500 || *status == 429,
            Error::GatherFailed { source, .. } => source.is_transient(),
            _ => false,
        }
    }

    /// Category that failed, when this error came out of the dispatcher
    pub fn failed_category(&self) -> Option<&str> {
        match self {
            Error::GatherFailed { category, .. } => Some(category),
            _ => None,
        }
    }
}

/// Result type alias for svc-info
pub type Result<T> = std::result::Result<T, Error>;
