//! Activity log endpoint

use crate::error::ApiResult;
use crate::extractors::SignedIn;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Json,
};
use calltrack_pages::{ActivityLog, ActivityLogView};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query parameters for the activity log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityQuery {
    /// Case-insensitive search over title, description and customer
    pub q: Option<String>,
}

/// `GET /api/activity`
///
/// The signed-in user's calls and appointments, newest first, filtered by
/// `q` when given.
///
/// # Errors
///
/// Returns 401 without a session and 502 when the backend fails.
pub async fn get_activity(
    State(state): State<Arc<AppState>>,
    SignedIn(token): SignedIn,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Json<ActivityLogView>> {
    let services = state.services(Some(&token));
    let log = ActivityLog::load(services.as_ref()).await?;

    Ok(Json(log.view(query.q.as_deref(), chrono::Utc::now())))
}
