//! Leaderboard page

use crate::error::PageResult;
use crate::service::{AuthService, CallRecordService, ProfileService};
use calltrack_core::leaderboard::{rank_salespeople, standing_of, window_start};
use calltrack_core::types::{OrganizationId, SalespersonMetric};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Ranked salespeople for the signed-in user's organization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardView {
    /// Organization the board covers, if the user belongs to one
    pub organization_id: Option<OrganizationId>,

    /// Start of the counting window
    pub window_start: DateTime<Utc>,

    /// Length of the counting window in days
    pub window_days: u32,

    /// Rows, best first
    pub rankings: Vec<SalespersonMetric>,

    /// The signed-in user's own row
    pub current_user: Option<SalespersonMetric>,
}

/// Build the leaderboard for the signed-in user's organization
///
/// Users without a profile or an organization get an empty board.
///
/// # Errors
///
/// Fails when the window is out of range, nobody is signed in or a fetch
/// fails.
pub async fn load_leaderboard<S>(
    services: &S,
    window_days: u32,
    now: DateTime<Utc>,
) -> PageResult<LeaderboardView>
where
    S: AuthService + ProfileService + CallRecordService + ?Sized,
{
    let since = window_start(now, window_days)?;
    let user = services.current_user().await?;

    let organization_id = services
        .profile(user.id)
        .await?
        .and_then(|profile| profile.organization_id);

    let Some(organization_id) = organization_id else {
        warn!("User {} has no organization, leaderboard is empty", user.id);
        return Ok(LeaderboardView {
            organization_id: None,
            window_start: since,
            window_days,
            rankings: Vec::new(),
            current_user: None,
        });
    };

    let profiles = services.organization_profiles(organization_id).await?;
    let calls = services
        .organization_calls_since(organization_id, since)
        .await?;

    let rankings = rank_salespeople(&profiles, &calls);
    let current_user = standing_of(&rankings, user.id).cloned();

    info!(
        "Ranked {} salespeople over {} calls for organization {}",
        rankings.len(),
        calls.len(),
        organization_id
    );

    Ok(LeaderboardView {
        organization_id: Some(organization_id),
        window_start: since,
        window_days,
        rankings,
        current_user,
    })
}
