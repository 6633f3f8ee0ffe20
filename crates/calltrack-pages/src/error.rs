//! Error types for the page controllers

use calltrack_client::ClientError;
use thiserror::Error;

/// Shown when a failure carries no message of its own
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Result type alias for page operations
pub type PageResult<T> = Result<T, PageError>;

/// Errors surfaced by the page controllers
#[derive(Error, Debug)]
pub enum PageError {
    /// Local input check failed; nothing was sent to the backend
    #[error("Validation error: {field} - {message}")]
    Validation {
        /// Field that failed
        field: String,
        /// Message shown next to the field
        message: String,
    },

    /// Invitation token missing, unknown, used or expired
    #[error("Invalid invitation: {message}")]
    InvalidToken {
        /// Message shown on the page
        message: String,
    },

    /// No signed-in user, or the session was rejected
    #[error("Not signed in")]
    Unauthorized,

    /// The requested row does not exist
    #[error("{what} not found")]
    NotFound {
        /// What was looked up
        what: String,
    },

    /// The action is not allowed from the page's current state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// A backend call failed
    #[error("Remote call failed: {}", .message.as_deref().unwrap_or("no message"))]
    Remote {
        /// HTTP status, when the backend answered
        status: Option<u16>,
        /// Message from the backend, if any
        message: Option<String>,
    },

    /// Failure inside the core crate
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PageError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-token error
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create an invalid-state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a remote error carrying only a message
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            status: None,
            message: Some(message.into()),
        }
    }

    /// Message to show the user
    ///
    /// Remote failures without a message fall back to
    /// [`GENERIC_ERROR_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. }
            | Self::InvalidToken { message }
            | Self::InvalidState { message } => message.clone(),
            Self::Unauthorized => "Please sign in to continue.".to_string(),
            Self::NotFound { what } => format!("{what} not found."),
            Self::Remote {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Remote { message: None, .. } | Self::Internal(_) => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// Whether the error was raised before any backend call
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidState { .. })
    }
}

impl From<ClientError> for PageError {
    fn from(err: ClientError) -> Self {
        if err.is_unauthorized() {
            return Self::Unauthorized;
        }

        match err {
            ClientError::Api { status, message } => Self::Remote {
                status: Some(status),
                message,
            },
            ClientError::Http(_) | ClientError::Decode(_) | ClientError::Configuration { .. } => {
                Self::Remote {
                    status: None,
                    message: None,
                }
            }
        }
    }
}

impl From<calltrack_core::Error> for PageError {
    fn from(err: calltrack_core::Error) -> Self {
        match err {
            calltrack_core::Error::Validation { field, message } => {
                Self::Validation { field, message }
            }
            other => Self::Internal(other.to_string()),
        }
    }
}
