//! Data services the page controllers depend on
//!
//! Each trait covers one slice of backend data. Controllers are generic over
//! the traits they need, so the same controller runs against the remote
//! backend in production and against [`crate::mock::MockBackend`] in tests.

use crate::error::PageResult;
use async_trait::async_trait;
use calltrack_core::types::{
    AppointmentRecord, CallRecord, CurrentUser, InvitationDetails, LoginHistoryEntry,
    OrganizationId, Profile, TrustedDevice, TwoFactorSetup, TwoFactorStatus, UserId,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// The signed-in user
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve the user the current session belongs to
    async fn current_user(&self) -> PageResult<CurrentUser>;
}

/// Profile rows
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Profile of one user, if it exists
    async fn profile(&self, user_id: UserId) -> PageResult<Option<Profile>>;

    /// Every profile in an organization, ordered by user id
    ///
    /// The order must be stable across calls: it breaks leaderboard ties.
    async fn organization_profiles(&self, organization_id: OrganizationId)
    -> PageResult<Vec<Profile>>;
}

/// Recorded calls
#[async_trait]
pub trait CallRecordService: Send + Sync {
    /// Calls recorded by one user, newest first
    async fn calls_for_user(&self, user_id: UserId) -> PageResult<Vec<CallRecord>>;

    /// Calls recorded in an organization at or after `since`
    async fn organization_calls_since(
        &self,
        organization_id: OrganizationId,
        since: DateTime<Utc>,
    ) -> PageResult<Vec<CallRecord>>;
}

/// Booked appointments
#[async_trait]
pub trait AppointmentService: Send + Sync {
    /// Appointments booked by one user, newest first
    async fn appointments_for_user(&self, user_id: UserId) -> PageResult<Vec<AppointmentRecord>>;
}

/// Organization invitations
#[async_trait]
pub trait InvitationService: Send + Sync {
    /// Check a token and return what it invites to
    async fn validate_invitation(&self, token: &str) -> PageResult<InvitationDetails>;

    /// Create the invitee's account
    async fn accept_invitation(&self, token: &str, full_name: &str, password: &str)
    -> PageResult<()>;
}

/// Two-factor authentication for the signed-in user
#[async_trait]
pub trait TwoFactorService: Send + Sync {
    /// Whether 2FA is on or a setup awaits verification
    async fn two_factor_status(&self) -> PageResult<TwoFactorStatus>;

    /// Start setup and return the secret and backup codes
    async fn setup_two_factor(&self) -> PageResult<TwoFactorSetup>;

    /// Verify `code` against the pending setup and turn 2FA on
    async fn enable_two_factor(&self, code: &str) -> PageResult<()>;

    /// Turn 2FA off
    async fn disable_two_factor(&self) -> PageResult<()>;
}

/// Sign-in attempts
#[async_trait]
pub trait LoginHistoryService: Send + Sync {
    /// Up to `limit` attempts for `user_id`, newest first, skipping `offset`
    async fn login_history(
        &self,
        user_id: UserId,
        offset: u64,
        limit: u64,
    ) -> PageResult<Vec<LoginHistoryEntry>>;
}

/// Remembered devices
#[async_trait]
pub trait DeviceService: Send + Sync {
    /// Up to `limit` devices for `user_id`, most recently used first
    async fn trusted_devices(
        &self,
        user_id: UserId,
        offset: u64,
        limit: u64,
    ) -> PageResult<Vec<TrustedDevice>>;

    /// Forget one device
    async fn remove_trusted_device(&self, user_id: UserId, device_id: Uuid) -> PageResult<()>;
}

/// Everything a page may need, as one object
pub trait Services:
    AuthService
    + ProfileService
    + CallRecordService
    + AppointmentService
    + InvitationService
    + TwoFactorService
    + LoginHistoryService
    + DeviceService
{
}

impl<T> Services for T where
    T: AuthService
        + ProfileService
        + CallRecordService
        + AppointmentService
        + InvitationService
        + TwoFactorService
        + LoginHistoryService
        + DeviceService
{
}

/// Opens per-request service handles
///
/// The HTTP layer holds one connector and asks it for services bound to the
/// caller's access token on every request.
pub trait Connector: Send + Sync + std::fmt::Debug {
    /// Services acting as the holder of `access_token`, or anonymously
    fn connect(&self, access_token: Option<&str>) -> Arc<dyn Services>;
}
