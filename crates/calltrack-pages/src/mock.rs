//! In-memory backend for tests and local runs
//!
//! Every service call is counted, so tests can assert that a rejected input
//! never reached the backend.

use crate::error::{PageError, PageResult};
use crate::service::{
    AppointmentService, AuthService, CallRecordService, Connector, DeviceService,
    InvitationService, LoginHistoryService, ProfileService, Services, TwoFactorService,
};
use async_trait::async_trait;
use calltrack_core::types::{
    AppointmentRecord, CallRecord, CurrentUser, InvitationDetails, LoginHistoryEntry,
    OrganizationId, Profile, TrustedDevice, TwoFactorSetup, TwoFactorStatus, UserId,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Code the mock accepts when enabling 2FA, unless overridden
pub const DEFAULT_VERIFICATION_CODE: &str = "123456";

/// An invitation accepted through the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedInvitation {
    /// Token that was redeemed
    pub token: String,
    /// Name the invitee registered with
    pub full_name: String,
}

#[derive(Debug, Default)]
struct MockState {
    current_user: Option<CurrentUser>,
    profiles: Vec<Profile>,
    calls: Vec<CallRecord>,
    appointments: Vec<AppointmentRecord>,
    invitations: HashMap<String, InvitationDetails>,
    accepted: Vec<AcceptedInvitation>,
    two_factor_enabled: bool,
    pending_setup: Option<TwoFactorSetup>,
    verification_code: String,
    login_history: Vec<LoginHistoryEntry>,
    devices: Vec<TrustedDevice>,
    failures: HashMap<&'static str, Option<String>>,
    call_counts: HashMap<&'static str, usize>,
}

/// Shared in-memory backend implementing every service trait
///
/// Clones share state. A handle obtained through [`Connector::connect`]
/// without a token behaves as a signed-out visitor.
#[derive(Debug, Clone)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
    anonymous: bool,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create an empty backend with no signed-in user
    pub fn new() -> Self {
        let state = MockState {
            verification_code: DEFAULT_VERIFICATION_CODE.to_string(),
            ..MockState::default()
        };

        Self {
            state: Arc::new(Mutex::new(state)),
            anonymous: false,
        }
    }

    /// Sign `user` in
    #[must_use]
    pub fn with_user(self, user: CurrentUser) -> Self {
        self.state.lock().current_user = Some(user);
        self
    }

    /// Add a profile row
    #[must_use]
    pub fn with_profile(self, profile: Profile) -> Self {
        self.state.lock().profiles.push(profile);
        self
    }

    /// Add a call row
    #[must_use]
    pub fn with_call(self, call: CallRecord) -> Self {
        self.state.lock().calls.push(call);
        self
    }

    /// Add an appointment row
    #[must_use]
    pub fn with_appointment(self, appointment: AppointmentRecord) -> Self {
        self.state.lock().appointments.push(appointment);
        self
    }

    /// Register an open invitation
    #[must_use]
    pub fn with_invitation(self, token: impl Into<String>, details: InvitationDetails) -> Self {
        self.state.lock().invitations.insert(token.into(), details);
        self
    }

    /// Start with 2FA already on
    #[must_use]
    pub fn with_two_factor_enabled(self) -> Self {
        self.state.lock().two_factor_enabled = true;
        self
    }

    /// Code accepted when enabling 2FA
    #[must_use]
    pub fn with_verification_code(self, code: impl Into<String>) -> Self {
        self.state.lock().verification_code = code.into();
        self
    }

    /// Add a login attempt for the signed-in user
    #[must_use]
    pub fn with_login(self, entry: LoginHistoryEntry) -> Self {
        self.state.lock().login_history.push(entry);
        self
    }

    /// Add a trusted device for the signed-in user
    #[must_use]
    pub fn with_device(self, device: TrustedDevice) -> Self {
        self.state.lock().devices.push(device);
        self
    }

    /// Make every call to `method` fail with `message`
    #[must_use]
    pub fn fail_on(self, method: &'static str, message: Option<&str>) -> Self {
        self.state
            .lock()
            .failures
            .insert(method, message.map(str::to_string));
        self
    }

    /// Total number of service calls made so far
    pub fn remote_calls(&self) -> usize {
        self.state.lock().call_counts.values().sum()
    }

    /// Number of calls made to one service method
    pub fn calls_to(&self, method: &str) -> usize {
        self.state
            .lock()
            .call_counts
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    /// Invitations accepted so far
    pub fn accepted_invitations(&self) -> Vec<AcceptedInvitation> {
        self.state.lock().accepted.clone()
    }

    /// Whether 2FA is on right now
    pub fn two_factor_is_enabled(&self) -> bool {
        self.state.lock().two_factor_enabled
    }

    /// Count the call and apply any configured failure
    fn record(&self, method: &'static str) -> PageResult<()> {
        let mut state = self.state.lock();
        *state.call_counts.entry(method).or_insert(0) += 1;

        match state.failures.get(method) {
            Some(message) => Err(PageError::Remote {
                status: Some(500),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn page_of<T: Clone>(rows: &[T], offset: u64, limit: u64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    rows.iter().skip(offset).take(limit).cloned().collect()
}

fn mock_setup() -> TwoFactorSetup {
    let secret = "JBSWY3DPEHPK3PXP".to_string();
    TwoFactorSetup {
        qr_code_url: format!("otpauth://totp/calltrack?secret={secret}&issuer=calltrack"),
        secret,
        backup_codes: (1..=10).map(|i| format!("BACKUP-{i:04}")).collect(),
    }
}

#[async_trait]
impl AuthService for MockBackend {
    async fn current_user(&self) -> PageResult<CurrentUser> {
        self.record("current_user")?;
        if self.anonymous {
            return Err(PageError::Unauthorized);
        }
        self.state
            .lock()
            .current_user
            .clone()
            .ok_or(PageError::Unauthorized)
    }
}

#[async_trait]
impl ProfileService for MockBackend {
    async fn profile(&self, user_id: UserId) -> PageResult<Option<Profile>> {
        self.record("profile")?;
        Ok(self
            .state
            .lock()
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn organization_profiles(
        &self,
        organization_id: OrganizationId,
    ) -> PageResult<Vec<Profile>> {
        self.record("organization_profiles")?;
        let mut profiles: Vec<Profile> = self
            .state
            .lock()
            .profiles
            .iter()
            .filter(|p| p.organization_id == Some(organization_id))
            .cloned()
            .collect();
        profiles.sort_by_key(|p| p.user_id);
        Ok(profiles)
    }
}

#[async_trait]
impl CallRecordService for MockBackend {
    async fn calls_for_user(&self, user_id: UserId) -> PageResult<Vec<CallRecord>> {
        self.record("calls_for_user")?;
        let mut calls: Vec<CallRecord> = self
            .state
            .lock()
            .calls
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        calls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(calls)
    }

    async fn organization_calls_since(
        &self,
        organization_id: OrganizationId,
        since: DateTime<Utc>,
    ) -> PageResult<Vec<CallRecord>> {
        self.record("organization_calls_since")?;
        Ok(self
            .state
            .lock()
            .calls
            .iter()
            .filter(|c| c.organization_id == Some(organization_id) && c.created_at >= since)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AppointmentService for MockBackend {
    async fn appointments_for_user(&self, user_id: UserId) -> PageResult<Vec<AppointmentRecord>> {
        self.record("appointments_for_user")?;
        let mut appointments: Vec<AppointmentRecord> = self
            .state
            .lock()
            .appointments
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        appointments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(appointments)
    }
}

#[async_trait]
impl InvitationService for MockBackend {
    async fn validate_invitation(&self, token: &str) -> PageResult<InvitationDetails> {
        self.record("validate_invitation")?;
        self.state
            .lock()
            .invitations
            .get(token)
            .cloned()
            .ok_or_else(|| PageError::Remote {
                status: Some(400),
                message: Some("Invitation not found or expired".to_string()),
            })
    }

    async fn accept_invitation(
        &self,
        token: &str,
        full_name: &str,
        _password: &str,
    ) -> PageResult<()> {
        self.record("accept_invitation")?;
        let mut state = self.state.lock();
        if state.invitations.remove(token).is_none() {
            return Err(PageError::Remote {
                status: Some(400),
                message: Some("Invitation has already been used".to_string()),
            });
        }
        state.accepted.push(AcceptedInvitation {
            token: token.to_string(),
            full_name: full_name.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl TwoFactorService for MockBackend {
    async fn two_factor_status(&self) -> PageResult<TwoFactorStatus> {
        self.record("two_factor_status")?;
        let state = self.state.lock();
        Ok(TwoFactorStatus {
            enabled: state.two_factor_enabled,
            setup_pending: state.pending_setup.is_some(),
        })
    }

    async fn setup_two_factor(&self) -> PageResult<TwoFactorSetup> {
        self.record("setup_two_factor")?;
        let setup = mock_setup();
        self.state.lock().pending_setup = Some(setup.clone());
        Ok(setup)
    }

    async fn enable_two_factor(&self, code: &str) -> PageResult<()> {
        self.record("enable_two_factor")?;
        let mut state = self.state.lock();
        if state.pending_setup.is_none() {
            return Err(PageError::remote("No two-factor setup in progress"));
        }
        if code != state.verification_code {
            return Err(PageError::remote("Invalid verification code"));
        }
        state.pending_setup = None;
        state.two_factor_enabled = true;
        Ok(())
    }

    async fn disable_two_factor(&self) -> PageResult<()> {
        self.record("disable_two_factor")?;
        self.state.lock().two_factor_enabled = false;
        Ok(())
    }
}

#[async_trait]
impl LoginHistoryService for MockBackend {
    async fn login_history(
        &self,
        _user_id: UserId,
        offset: u64,
        limit: u64,
    ) -> PageResult<Vec<LoginHistoryEntry>> {
        self.record("login_history")?;
        let mut rows = self.state.lock().login_history.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_of(&rows, offset, limit))
    }
}

#[async_trait]
impl DeviceService for MockBackend {
    async fn trusted_devices(
        &self,
        _user_id: UserId,
        offset: u64,
        limit: u64,
    ) -> PageResult<Vec<TrustedDevice>> {
        self.record("trusted_devices")?;
        let mut rows = self.state.lock().devices.clone();
        rows.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at));
        Ok(page_of(&rows, offset, limit))
    }

    async fn remove_trusted_device(&self, _user_id: UserId, device_id: Uuid) -> PageResult<()> {
        self.record("remove_trusted_device")?;
        self.state.lock().devices.retain(|d| d.id != device_id);
        Ok(())
    }
}

impl Connector for MockBackend {
    fn connect(&self, access_token: Option<&str>) -> Arc<dyn Services> {
        Arc::new(Self {
            state: Arc::clone(&self.state),
            anonymous: access_token.is_none(),
        })
    }
}
