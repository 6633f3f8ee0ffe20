//! Custom extractors for request processing

pub mod pagination;
pub mod validated_json;

pub use pagination::PageQuery;
pub use validated_json::ValidatedJson;

use crate::error::ApiError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use http::header::AUTHORIZATION;

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Bearer token of a signed-in user; rejects the request when absent
#[derive(Debug, Clone)]
pub struct SignedIn(pub String);

impl SignedIn {
    /// The access token
    pub fn token(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SignedIn
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(parts)
            .map(Self)
            .ok_or_else(|| ApiError::unauthorized("Sign in to continue"))
    }
}
