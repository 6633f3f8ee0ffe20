//! API route definitions

use crate::{handlers, state::AppState};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use calltrack_core::config::ApiConfig;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::debug;

/// Page endpoints
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activity", get(handlers::activity::get_activity))
        .route(
            "/api/leaderboard",
            get(handlers::leaderboard::get_leaderboard),
        )
        .route(
            "/api/invitations/accept",
            post(handlers::invitations::accept_invitation),
        )
        .route(
            "/api/invitations/validate",
            get(handlers::invitations::validate_invitation),
        )
        .route(
            "/api/security/2fa",
            get(handlers::security::get_two_factor),
        )
        .route(
            "/api/security/2fa/setup",
            post(handlers::security::setup_two_factor),
        )
        .route(
            "/api/security/2fa/enable",
            post(handlers::security::enable_two_factor),
        )
        .route(
            "/api/security/2fa/disable",
            post(handlers::security::disable_two_factor),
        )
        .route(
            "/api/security/devices",
            get(handlers::security::list_devices),
        )
        .route(
            "/api/security/devices/:id",
            delete(handlers::security::remove_device),
        )
        .route(
            "/api/security/login-history",
            get(handlers::security::list_login_history),
        )
}

/// Health check routes
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(handlers::health::health_check))
}

/// CORS policy from the API configuration, `None` when CORS is off
pub fn cors_layer(api: &ApiConfig) -> Option<CorsLayer> {
    if !api.enable_cors {
        debug!("CORS disabled in configuration");
        return None;
    }

    let origins = if api.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let allowed = api.cors_origins.clone();
        AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .is_ok_and(|origin| is_origin_allowed(origin, &allowed))
        })
    };

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}

/// Exact match, or a `*.example.com` subdomain pattern
fn is_origin_allowed(origin: &str, allowed_origins: &[String]) -> bool {
    allowed_origins.iter().any(|allowed| {
        allowed == origin
            || allowed
                .strip_prefix("*.")
                .is_some_and(|domain| origin.ends_with(&format!(".{domain}")))
    })
}
