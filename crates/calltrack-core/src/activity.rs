//! Activity timeline: merge calls and appointments, newest first
//!
//! The timeline is rebuilt from scratch whenever the source rows or the
//! search query change; nothing here keeps state between calls.

use crate::types::{ActivityEntry, ActivityKind, AppointmentRecord, CallRecord};
use crate::utils::{format_call_duration, format_scheduled_for};
use serde::{Deserialize, Serialize};

/// Map a call row to a timeline entry
#[must_use]
pub fn call_entry(call: &CallRecord) -> ActivityEntry {
    let name = call.customer_name.as_deref().unwrap_or("Unknown");

    ActivityEntry {
        id: format!("call-{}", call.id),
        kind: ActivityKind::Call,
        title: format!("Call with {name}"),
        description: format_call_duration(call.duration_seconds.unwrap_or(0)),
        timestamp: call.created_at,
        customer_name: call.customer_name.clone(),
    }
}

/// Map an appointment row to a timeline entry
///
/// The entry is ordered by when the appointment was booked, while the
/// description shows when it is scheduled.
#[must_use]
pub fn appointment_entry(appointment: &AppointmentRecord) -> ActivityEntry {
    ActivityEntry {
        id: format!("apt-{}", appointment.id),
        kind: ActivityKind::Appointment,
        title: format!("Appointment: {}", appointment.customer_name),
        description: format_scheduled_for(&appointment.appointment_date),
        timestamp: appointment.created_at,
        customer_name: Some(appointment.customer_name.clone()),
    }
}

/// Merge both sources into one timeline sorted by timestamp, newest first
///
/// The sort is stable: entries sharing a timestamp keep calls before
/// appointments, each in source order.
#[must_use]
pub fn merge_activity(
    calls: &[CallRecord],
    appointments: &[AppointmentRecord],
) -> Vec<ActivityEntry> {
    let mut entries: Vec<ActivityEntry> = calls
        .iter()
        .map(call_entry)
        .chain(appointments.iter().map(appointment_entry))
        .collect();

    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries
}

/// Whether `entry` matches an already-lowercased query
fn matches_query(entry: &ActivityEntry, needle: &str) -> bool {
    entry.title.to_lowercase().contains(needle)
        || entry.description.to_lowercase().contains(needle)
        || entry
            .customer_name
            .as_ref()
            .is_some_and(|name| name.to_lowercase().contains(needle))
}

/// Keep entries whose title, description or customer name contains `query`
///
/// Matching is case-insensitive. `None` or an empty query keeps everything.
#[must_use]
pub fn filter_activity(entries: Vec<ActivityEntry>, query: Option<&str>) -> Vec<ActivityEntry> {
    match query {
        Some(query) if !query.is_empty() => {
            let needle = query.to_lowercase();
            entries
                .into_iter()
                .filter(|entry| matches_query(entry, &needle))
                .collect()
        }
        _ => entries,
    }
}

/// Merge, sort and filter in one pass
#[must_use]
pub fn build_timeline(
    calls: &[CallRecord],
    appointments: &[AppointmentRecord],
    query: Option<&str>,
) -> Vec<ActivityEntry> {
    filter_activity(merge_activity(calls, appointments), query)
}

/// Entry counts per kind for a timeline
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivitySummary {
    /// All entries
    pub total: usize,
    /// Call entries
    pub calls: usize,
    /// Email entries
    pub emails: usize,
    /// Appointment entries
    pub appointments: usize,
    /// Note entries
    pub notes: usize,
}

impl ActivitySummary {
    /// Count entries by kind
    #[must_use]
    pub fn from_entries(entries: &[ActivityEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut summary, entry| {
            summary.total += 1;
            match entry.kind {
                ActivityKind::Call => summary.calls += 1,
                ActivityKind::Email => summary.emails += 1,
                ActivityKind::Appointment => summary.appointments += 1,
                ActivityKind::Note => summary.notes += 1,
            }
            summary
        })
    }
}
