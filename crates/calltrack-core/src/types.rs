//! Core data types for calltrack

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated user identifier
pub type UserId = Uuid;

/// Organization identifier
pub type OrganizationId = Uuid;

/// Kind of an activity timeline entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Recorded sales call
    Call,
    /// Email sent to a customer
    Email,
    /// Booked appointment
    Appointment,
    /// Free-form note
    Note,
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Email => write!(f, "email"),
            Self::Appointment => write!(f, "appointment"),
            Self::Note => write!(f, "note"),
        }
    }
}

/// A recorded sales call as stored in the `call_records` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallRecord {
    /// Row identifier
    pub id: Uuid,

    /// Salesperson who recorded the call
    pub user_id: UserId,

    /// Organization the salesperson belongs to
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,

    /// Who was on the other end of the call
    #[serde(default)]
    pub customer_name: Option<String>,

    /// Length of the recording in seconds
    #[serde(default)]
    pub duration_seconds: Option<u32>,

    /// When the call was recorded
    pub created_at: DateTime<Utc>,
}

/// A booked appointment as stored in the `appointments` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentRecord {
    /// Row identifier
    pub id: Uuid,

    /// Salesperson who booked the appointment
    pub user_id: UserId,

    /// Customer the appointment is with
    pub customer_name: String,

    /// When the appointment is scheduled to happen
    pub appointment_date: DateTime<Utc>,

    /// When the appointment was booked
    pub created_at: DateTime<Utc>,
}

/// A row of the `profiles` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Owning user
    pub user_id: UserId,

    /// Full display name
    #[serde(default)]
    pub full_name: Option<String>,

    /// Contact email
    #[serde(default)]
    pub email: Option<String>,

    /// Organization membership
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
}

impl Profile {
    /// Name shown for this profile: full name, then email, then "Unknown"
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.email.as_deref().filter(|email| !email.is_empty()))
            .unwrap_or("Unknown")
    }
}

/// The signed-in user as reported by the auth provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    /// User identifier
    pub id: UserId,

    /// Sign-in email
    #[serde(default)]
    pub email: Option<String>,
}

/// One normalized, display-ready row of the activity timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityEntry {
    /// Identifier, unique across sources (`call-…`, `apt-…`)
    pub id: String,

    /// Entry kind
    #[serde(rename = "type")]
    pub kind: ActivityKind,

    /// Headline
    pub title: String,

    /// Secondary line
    pub description: String,

    /// Instant the timeline is ordered by
    pub timestamp: DateTime<Utc>,

    /// Customer involved, when known
    pub customer_name: Option<String>,
}

/// A leaderboard metric that may not be computed yet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    /// Not implemented by the data source yet
    Pending,
    /// Computed value
    Ready(f64),
}

impl MetricValue {
    /// Whether the metric carries a real value
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// One leaderboard row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalespersonMetric {
    /// Salesperson
    pub user_id: UserId,

    /// Display name
    pub name: String,

    /// Calls recorded inside the leaderboard window
    pub recording_count: u64,

    /// 1-based position on the board
    pub rank: u32,

    /// Share of calls that led to an appointment
    pub conversion_rate: MetricValue,

    /// Average call score
    pub average_score: MetricValue,
}

/// Invitation details returned when a token checks out
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvitationDetails {
    /// Invited email address (read-only in the form)
    pub email: String,

    /// Organization the invitation is for
    #[serde(default)]
    pub organization_name: Option<String>,

    /// Role granted on acceptance
    #[serde(default)]
    pub role: Option<String>,
}

/// Material produced when two-factor setup starts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TwoFactorSetup {
    /// Shared secret, for manual entry
    pub secret: String,

    /// Scannable representation of the secret
    pub qr_code_url: String,

    /// Single-use recovery codes
    pub backup_codes: Vec<String>,
}

/// Two-factor state as reported by the backend
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TwoFactorStatus {
    /// 2FA is on
    pub enabled: bool,

    /// A setup was started but not yet verified
    #[serde(default)]
    pub setup_pending: bool,
}

/// A login attempt shown on the security page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginHistoryEntry {
    /// Row identifier
    pub id: Uuid,

    /// Client address
    #[serde(default)]
    pub ip_address: Option<String>,

    /// Client user agent
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Resolved location
    #[serde(default)]
    pub location: Option<String>,

    /// Whether the attempt succeeded
    pub success: bool,

    /// When the attempt happened
    pub created_at: DateTime<Utc>,
}

/// A device remembered for the signed-in user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrustedDevice {
    /// Row identifier
    pub id: Uuid,

    /// Human-readable device name
    pub device_name: String,

    /// Last time the device was used to sign in
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,

    /// When the device was first trusted
    pub created_at: DateTime<Utc>,
}

/// One page of a paginated read view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page<T> {
    /// Rows on this page
    pub items: Vec<T>,

    /// 1-based page number
    pub page: u32,

    /// Requested page size
    pub page_size: u32,

    /// Whether another page follows
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Build a page from `page_size + 1` fetched rows
    ///
    /// The extra row only signals that more data exists and is dropped.
    #[must_use]
    pub fn from_lookahead(mut rows: Vec<T>, page: u32, page_size: u32) -> Self {
        let limit = page_size as usize;
        let has_more = rows.len() > limit;
        rows.truncate(limit);

        Self {
            items: rows,
            page,
            page_size,
            has_more,
        }
    }

    /// Zero-based offset of the first row of `page`
    #[must_use]
    pub const fn offset(page: u32, page_size: u32) -> u64 {
        (page.saturating_sub(1) as u64) * page_size as u64
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn profile(full_name: Option<&str>, email: Option<&str>) -> Profile {
        Profile {
            user_id: Uuid::new_v4(),
            full_name: full_name.map(str::to_string),
            email: email.map(str::to_string),
            organization_id: None,
        }
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(profile(Some("Ada"), Some("a@x.io")).display_name(), "Ada");
        assert_eq!(profile(Some("  "), Some("a@x.io")).display_name(), "a@x.io");
        assert_eq!(profile(None, Some("a@x.io")).display_name(), "a@x.io");
        assert_eq!(profile(None, None).display_name(), "Unknown");
    }

    #[test]
    fn test_activity_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ActivityKind::Appointment).unwrap(),
            "\"appointment\""
        );
        assert_eq!(ActivityKind::Call.to_string(), "call");
    }

    #[test]
    fn test_activity_entry_uses_type_key() {
        let entry = ActivityEntry {
            id: "call-1".to_string(),
            kind: ActivityKind::Call,
            title: "Call with Bob".to_string(),
            description: "Duration: 1m 0s".to_string(),
            timestamp: Utc::now(),
            customer_name: Some("Bob".to_string()),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "call");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_metric_value_serialization() {
        assert_eq!(
            serde_json::to_value(MetricValue::Pending).unwrap(),
            serde_json::json!({"status": "pending"})
        );
        assert_eq!(
            serde_json::to_value(MetricValue::Ready(0.5)).unwrap(),
            serde_json::json!({"status": "ready", "value": 0.5})
        );
        assert!(!MetricValue::Pending.is_ready());
    }

    #[test]
    fn test_call_record_tolerates_nulls() {
        let json = serde_json::json!({
            "id": Uuid::nil(),
            "user_id": Uuid::nil(),
            "customer_name": null,
            "duration_seconds": null,
            "created_at": "2026-01-05T10:00:00Z"
        });

        let call: CallRecord = serde_json::from_value(json).unwrap();
        assert!(call.customer_name.is_none());
        assert!(call.duration_seconds.is_none());
        assert!(call.organization_id.is_none());
    }

    #[test]
    fn test_page_from_lookahead() {
        let page = Page::from_lookahead(vec![1, 2, 3], 1, 2);
        assert_eq!(page.items, vec![1, 2]);
        assert!(page.has_more);

        let last = Page::from_lookahead(vec![1, 2], 2, 2);
        assert_eq!(last.items, vec![1, 2]);
        assert!(!last.has_more);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(Page::<()>::offset(1, 20), 0);
        assert_eq!(Page::<()>::offset(3, 20), 40);
        assert_eq!(Page::<()>::offset(0, 20), 0);
    }
}
