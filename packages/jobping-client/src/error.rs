//! Error types for the JobPing client.

use thiserror::Error;

/// Result type for JobPing client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// JobPing client errors.
///
/// Every operation resolves with a value or fails with exactly one of these
/// kinds. `Display` is the human-readable message the UI layer shows; the
/// variants stay distinguishable for callers that need kind-specific
/// handling (e.g. redirecting to login on a 401 [`ApiError::Api`]).
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input rejected client-side before any request was sent
    #[error("{0}")]
    Validation(String),

    /// Network failure (DNS, refused connection, timeout); no response was received
    #[error("Network error: {0}")]
    Transport(String),

    /// Non-2xx HTTP response, with the server's message when it sent one
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Malformed JSON on an otherwise successful response
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// HTTP status of an [`ApiError::Api`] failure, if that's what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 401 response, meaning the session token is missing or stale.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// True for a 404 response.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
