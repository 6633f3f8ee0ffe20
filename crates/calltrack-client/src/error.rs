//! Error types for the remote data client

use thiserror::Error;

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors returned by the remote data client
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a response (connect, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("Remote call failed with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        /// HTTP status code
        status: u16,
        /// Message extracted from the error body, if any
        message: Option<String>,
    },

    /// The response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The client could not be built from its configuration
    #[error("Invalid client configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },
}

impl ClientError {
    /// Message supplied by the backend, when it sent one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of an API error
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the caller's credentials
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }

    /// Whether the backend reported a missing row or function
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// Pull a human-readable message out of an error body
///
/// Row and RPC endpoints use `message`, the auth endpoints use `msg`,
/// `error_description` or `error`.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        .map(str::to_string)
        .filter(|message| !message.is_empty())
}
