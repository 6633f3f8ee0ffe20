//! Leaderboard ranking

use crate::types::{CallRecord, MetricValue, Profile, SalespersonMetric, UserId};
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Start of the trailing window ending at `now`
///
/// # Errors
///
/// Returns a validation error when the window reaches past the earliest
/// representable date.
pub fn window_start(now: DateTime<Utc>, window_days: u32) -> Result<DateTime<Utc>> {
    Duration::try_days(i64::from(window_days))
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| {
            Error::validation(
                "window_days",
                format!("A {window_days}-day window is out of range"),
            )
        })
}

/// Count calls per salesperson
#[must_use]
pub fn count_calls_by_user(calls: &[CallRecord]) -> HashMap<UserId, u64> {
    let mut counts = HashMap::new();
    for call in calls {
        *counts.entry(call.user_id).or_insert(0) += 1;
    }
    counts
}

/// Rank every profile by the number of calls it recorded
///
/// `profiles` and `calls` must already be scoped to one organization and the
/// leaderboard window. Rows are ordered by call count, highest first, then by
/// position in `profiles`; rank is the 1-based position in that order.
#[must_use]
pub fn rank_salespeople(profiles: &[Profile], calls: &[CallRecord]) -> Vec<SalespersonMetric> {
    let counts = count_calls_by_user(calls);

    let mut rows: Vec<(usize, &Profile, u64)> = profiles
        .iter()
        .enumerate()
        .map(|(position, profile)| {
            let count = counts.get(&profile.user_id).copied().unwrap_or(0);
            (position, profile, count)
        })
        .collect();

    rows.sort_by(|(pos_a, _, count_a), (pos_b, _, count_b)| {
        count_b.cmp(count_a).then_with(|| pos_a.cmp(pos_b))
    });

    rows.into_iter()
        .zip(1u32..)
        .map(|((_, profile, count), rank)| SalespersonMetric {
            user_id: profile.user_id,
            name: profile.display_name().to_string(),
            recording_count: count,
            rank,
            conversion_rate: MetricValue::Pending,
            average_score: MetricValue::Pending,
        })
        .collect()
}

/// Find the row belonging to `user_id`
#[must_use]
pub fn standing_of(board: &[SalespersonMetric], user_id: UserId) -> Option<&SalespersonMetric> {
    board.iter().find(|row| row.user_id == user_id)
}
