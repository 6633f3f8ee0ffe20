//! Page-number query extractor

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// `?page=` for the device and login-history tables
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Validate)]
pub struct PageQuery {
    /// Page number (1-based)
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u32>,
}

impl PageQuery {
    /// Requested page, first page when absent
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PageQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<Self>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid query parameters: {e}")))?;

        query
            .validate()
            .map_err(|e| ApiError::bad_request(format!("Invalid page: {e}")))?;

        Ok(query)
    }
}
