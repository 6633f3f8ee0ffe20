//! HTTP error responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use calltrack_pages::PageError;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// JSON body of every error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Message suitable for showing to the user
    pub error: String,
    /// Machine-readable error code
    pub code: String,
    /// Additional context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error returned by handlers and extractors
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    /// Create an error with an explicit status and code
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: message.into(),
                code: code.into(),
                details: None,
            },
        }
    }

    /// 400 with `BAD_REQUEST`
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// 401 with `UNAUTHORIZED`
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// Attach details
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.body.details = Some(details);
        self
    }

    /// Status the response will carry
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<PageError> for ApiError {
    fn from(err: PageError) -> Self {
        let message = err.user_message();

        match &err {
            PageError::Validation { field, .. } => {
                let field = field.clone();
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
                    .with_details(serde_json::json!({ "field": field }))
            }
            PageError::InvalidToken { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_TOKEN", message)
            }
            PageError::Unauthorized => Self::unauthorized(message),
            PageError::NotFound { .. } => Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message),
            PageError::InvalidState { .. } => {
                Self::new(StatusCode::CONFLICT, "INVALID_STATE", message)
            }
            PageError::Remote {
                status: Some(status),
                ..
            } if (400..500).contains(status) => {
                warn!("Backend rejected request: {}", err);
                Self::new(StatusCode::BAD_REQUEST, "REMOTE_REJECTED", message)
            }
            PageError::Remote { .. } => {
                error!("Backend call failed: {}", err);
                Self::new(StatusCode::BAD_GATEWAY, "REMOTE_ERROR", message)
            }
            PageError::Internal(_) => {
                error!("Internal error: {}", err);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;
