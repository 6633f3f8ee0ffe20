//! Activity log page: the signed-in user's calls and appointments as one
//! searchable timeline

use crate::error::PageResult;
use crate::service::{AppointmentService, AuthService, CallRecordService};
use calltrack_core::activity::{ActivitySummary, build_timeline};
use calltrack_core::types::{ActivityEntry, AppointmentRecord, CallRecord};
use calltrack_core::utils::format_relative_time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A timeline entry with its age rendered for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityRow {
    /// The entry itself
    #[serde(flatten)]
    pub entry: ActivityEntry,

    /// "5 mins ago", "2 days ago", or a date
    pub relative_time: String,
}

/// Everything the activity log page renders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityLogView {
    /// Filtered timeline, newest first
    pub entries: Vec<ActivityRow>,

    /// Counts per kind over the filtered timeline
    pub summary: ActivitySummary,

    /// Query the view was filtered by
    pub query: Option<String>,
}

/// Source rows fetched for the activity log
///
/// Views are derived from these rows on demand, so changing the query never
/// refetches.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    calls: Vec<CallRecord>,
    appointments: Vec<AppointmentRecord>,
}

impl ActivityLog {
    /// Fetch the signed-in user's calls and appointments
    ///
    /// # Errors
    ///
    /// Fails when nobody is signed in or either fetch fails.
    pub async fn load<S>(services: &S) -> PageResult<Self>
    where
        S: AuthService + CallRecordService + AppointmentService + ?Sized,
    {
        let user = services.current_user().await?;
        let calls = services.calls_for_user(user.id).await?;
        let appointments = services.appointments_for_user(user.id).await?;

        info!(
            "Loaded activity for {}: {} calls, {} appointments",
            user.id,
            calls.len(),
            appointments.len()
        );

        Ok(Self::from_rows(calls, appointments))
    }

    /// Build from rows already in hand
    pub const fn from_rows(calls: Vec<CallRecord>, appointments: Vec<AppointmentRecord>) -> Self {
        Self {
            calls,
            appointments,
        }
    }

    /// Timeline filtered by `query`, with ages relative to `now`
    pub fn view(&self, query: Option<&str>, now: DateTime<Utc>) -> ActivityLogView {
        let entries = build_timeline(&self.calls, &self.appointments, query);
        let summary = ActivitySummary::from_entries(&entries);
        debug!("Activity view for {:?}: {} entries", query, summary.total);

        let entries = entries
            .into_iter()
            .map(|entry| ActivityRow {
                relative_time: format_relative_time(&entry.timestamp, &now),
                entry,
            })
            .collect();

        ActivityLogView {
            entries,
            summary,
            query: query.filter(|q| !q.is_empty()).map(str::to_string),
        }
    }
}
