//! Leaderboard endpoint

use crate::error::{ApiError, ApiResult};
use crate::extractors::SignedIn;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Json,
};
use calltrack_pages::{LeaderboardView, load_leaderboard};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Query parameters for the leaderboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LeaderboardQuery {
    /// Counting window in days; the configured window when absent
    #[validate(range(min = 1, max = 365))]
    pub days: Option<u32>,
}

/// `GET /api/leaderboard`
///
/// # Errors
///
/// Returns 400 for an out-of-range window, 401 without a session and 502
/// when the backend fails.
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    SignedIn(token): SignedIn,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<LeaderboardView>> {
    query
        .validate()
        .map_err(|e| ApiError::bad_request(format!("Invalid window: {e}")))?;

    let window_days = query.days.unwrap_or(state.config.leaderboard.window_days);
    let services = state.services(Some(&token));
    let view = load_leaderboard(services.as_ref(), window_days, chrono::Utc::now()).await?;

    Ok(Json(view))
}
