//! Error types for model clients

use thiserror::Error;

/// Errors that can occur when invoking a model provider
#[derive(Error, Debug)]
pub enum ClientError {
    /// Required API key environment variable is not set
    #[error("missing API key: set {var}")]
    MissingApiKey { var: String },

    /// Transport-level HTTP failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("provider returned {status}: {detail}")]
    Api { status: u16, detail: String },

    /// Provider response body did not have the expected shape
    #[error("malformed provider response: {detail}")]
    MalformedResponse { detail: String },
}

/// Result type for client operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;
