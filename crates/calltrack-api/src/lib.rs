//! HTTP server for the calltrack pages
//!
//! Each page controller from `calltrack-pages` is exposed as a small set of
//! JSON endpoints. The caller's bearer token is forwarded to the hosted
//! backend, which enforces row-level access.

#![forbid(unsafe_code)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use state::AppState;

use axum::Router;
use calltrack_core::Config;
use calltrack_core::context_error::Result;
use std::sync::Arc;

/// Build the API router against the hosted backend in `config`
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the remote client
/// cannot be built.
pub fn build_router(config: Config) -> Result<Router> {
    let state = AppState::new(config)?;
    state.validate()?;
    Ok(router_with_state(state))
}

/// Build the API router around prepared state
pub fn router_with_state(state: AppState) -> Router {
    let cors = routes::cors_layer(&state.config.api);
    let app = Router::new()
        .merge(routes::health_routes())
        .merge(routes::api_routes())
        .with_state(Arc::new(state));

    match cors {
        Some(layer) => app.layer(layer),
        None => app,
    }
}
