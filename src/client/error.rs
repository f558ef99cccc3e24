//! Error type shared by the collaborator clients.

use thiserror::Error;

/// Errors from talking to an external service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered with a non-success status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a usable HTTP response.
    #[error("request failed: {0}")]
    Request(String),

    /// The response was well-formed HTTP but not what the protocol promises
    /// (missing choices, no inline image data, and so on).
    #[error("unexpected response: {0}")]
    Protocol(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        ClientError::Request(err.to_string())
    }
}
