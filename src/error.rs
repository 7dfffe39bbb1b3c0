//! Error types for handover.

use thiserror::Error;

/// Common error type for handover.
#[derive(Error, Debug)]
pub enum HandoverError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level HTTP failure (connect, timeout, body decoding).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The remote API answered with a non-success status.
    #[error("remote API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the remote API.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// Authentication error: missing, rejected or unrefreshable credentials.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] crate::template::TemplateError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl HandoverError {
    /// Whether the error means the caller must go through authorization again.
    pub fn is_auth(&self) -> bool {
        match self {
            HandoverError::Auth(_) => true,
            HandoverError::Api { status, .. } => *status == 401,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for HandoverError {
    fn from(e: reqwest::Error) -> Self {
        HandoverError::Http(e.to_string())
    }
}

/// Result type alias for handover operations.
pub type Result<T> = std::result::Result<T, HandoverError>;
