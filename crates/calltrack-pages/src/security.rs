//! Security settings page: two-factor authentication, trusted devices and
//! login history
//!
//! ```text
//! disabled <-> setup_in_progress -> enabled -> disabled
//! ```
//!
//! Device and login-history pages are read independently of the 2FA state.

use crate::error::{PageError, PageResult};
use crate::notify::{Toast, Toasts};
use crate::service::{AuthService, DeviceService, LoginHistoryService, TwoFactorService};
use calltrack_core::config::SecurityConfig;
use calltrack_core::types::{LoginHistoryEntry, Page, TrustedDevice, TwoFactorSetup};
use calltrack_core::utils::{backup_codes_text, parse_otp_code};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Two-factor authentication state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TwoFactorState {
    /// 2FA is off
    Disabled,
    /// A secret was issued and awaits a verification code
    SetupInProgress {
        /// Setup material; only known to the session that started the setup
        setup: Option<TwoFactorSetup>,
    },
    /// 2FA is on
    Enabled,
}

/// Controller for the security settings page
#[derive(Debug, Clone)]
pub struct SecuritySettings {
    state: TwoFactorState,
    otp_digits: usize,
    page_size: u32,
    toasts: Toasts,
}

impl SecuritySettings {
    /// Controller starting from `state`
    pub fn new(config: &SecurityConfig, state: TwoFactorState) -> Self {
        Self {
            state,
            otp_digits: config.otp_digits,
            page_size: config.page_size,
            toasts: Toasts::default(),
        }
    }

    /// Controller starting from the backend's current 2FA state
    ///
    /// # Errors
    ///
    /// Fails when the status lookup fails.
    pub async fn load<S>(config: &SecurityConfig, services: &S) -> PageResult<Self>
    where
        S: TwoFactorService + ?Sized,
    {
        let status = services.two_factor_status().await?;
        let state = if status.enabled {
            TwoFactorState::Enabled
        } else if status.setup_pending {
            TwoFactorState::SetupInProgress { setup: None }
        } else {
            TwoFactorState::Disabled
        };

        Ok(Self::new(config, state))
    }

    /// Current 2FA state
    pub const fn state(&self) -> &TwoFactorState {
        &self.state
    }

    /// Rows per device or login-history page
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Take the queued toasts
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        self.toasts.drain()
    }

    /// Backup codes of the setup in progress, one per line
    pub fn backup_codes_text(&self) -> Option<String> {
        match &self.state {
            TwoFactorState::SetupInProgress { setup: Some(setup) } => {
                Some(backup_codes_text(&setup.backup_codes))
            }
            _ => None,
        }
    }

    /// Issue a new secret and backup codes
    ///
    /// # Errors
    ///
    /// Fails when 2FA is already on or the backend call fails.
    pub async fn begin_setup<S>(&mut self, services: &S) -> PageResult<&TwoFactorSetup>
    where
        S: TwoFactorService + ?Sized,
    {
        if self.state == TwoFactorState::Enabled {
            return Err(PageError::invalid_state(
                "Two-factor authentication is already enabled",
            ));
        }

        let setup = match services.setup_two_factor().await {
            Ok(setup) => setup,
            Err(err) => {
                warn!("Starting two-factor setup failed: {}", err);
                self.toasts.push(Toast::error("Error", err.user_message()));
                return Err(err);
            }
        };
        info!(
            "Two-factor setup started with {} backup codes",
            setup.backup_codes.len()
        );

        self.state = TwoFactorState::SetupInProgress { setup: Some(setup) };
        match &self.state {
            TwoFactorState::SetupInProgress { setup: Some(setup) } => Ok(setup),
            _ => Err(PageError::Internal("setup was not stored".to_string())),
        }
    }

    /// Abandon the setup in progress
    pub fn cancel_setup(&mut self) {
        if matches!(self.state, TwoFactorState::SetupInProgress { .. }) {
            self.state = TwoFactorState::Disabled;
        }
    }

    /// Verify `code` and turn 2FA on
    ///
    /// Non-digits are stripped first; anything but exactly the configured
    /// number of digits is rejected without a backend call.
    ///
    /// # Errors
    ///
    /// Fails when no setup is in progress, the code is malformed, or the
    /// backend rejects it.
    pub async fn enable<S>(&mut self, services: &S, code: &str) -> PageResult<()>
    where
        S: TwoFactorService + ?Sized,
    {
        if !matches!(self.state, TwoFactorState::SetupInProgress { .. }) {
            return Err(PageError::invalid_state(
                "Start two-factor setup before verifying a code",
            ));
        }

        let code = parse_otp_code(code, self.otp_digits)?;

        if let Err(err) = services.enable_two_factor(&code).await {
            warn!("Two-factor verification failed: {}", err);
            self.toasts.push(Toast::error("Error", err.user_message()));
            return Err(err);
        }

        info!("Two-factor authentication enabled");
        self.toasts.push(Toast::success(
            "Two-factor authentication enabled",
            "Your account is now protected with 2FA.",
        ));
        self.state = TwoFactorState::Enabled;
        Ok(())
    }

    /// Turn 2FA off
    ///
    /// # Errors
    ///
    /// Fails when 2FA is not on or the backend call fails.
    pub async fn disable<S>(&mut self, services: &S) -> PageResult<()>
    where
        S: TwoFactorService + ?Sized,
    {
        if self.state != TwoFactorState::Enabled {
            return Err(PageError::invalid_state(
                "Two-factor authentication is not enabled",
            ));
        }

        if let Err(err) = services.disable_two_factor().await {
            warn!("Disabling two-factor authentication failed: {}", err);
            self.toasts.push(Toast::error("Error", err.user_message()));
            return Err(err);
        }

        info!("Two-factor authentication disabled");
        self.toasts.push(Toast::success(
            "Two-factor authentication disabled",
            "2FA has been turned off for your account.",
        ));
        self.state = TwoFactorState::Disabled;
        Ok(())
    }

    fn check_page(page: u32) -> PageResult<()> {
        if page == 0 {
            return Err(PageError::validation("page", "Page numbers start at 1"));
        }
        Ok(())
    }

    /// One page of the signed-in user's trusted devices
    ///
    /// # Errors
    ///
    /// Fails for page 0, when nobody is signed in, or when the fetch fails.
    pub async fn devices<S>(&self, services: &S, page: u32) -> PageResult<Page<TrustedDevice>>
    where
        S: AuthService + DeviceService + ?Sized,
    {
        Self::check_page(page)?;
        let user = services.current_user().await?;
        let rows = services
            .trusted_devices(
                user.id,
                Page::<TrustedDevice>::offset(page, self.page_size),
                u64::from(self.page_size) + 1,
            )
            .await?;

        Ok(Page::from_lookahead(rows, page, self.page_size))
    }

    /// Forget one of the signed-in user's devices
    ///
    /// # Errors
    ///
    /// Fails when nobody is signed in or the delete fails.
    pub async fn remove_device<S>(&mut self, services: &S, device_id: Uuid) -> PageResult<()>
    where
        S: AuthService + DeviceService + ?Sized,
    {
        let user = services.current_user().await?;

        if let Err(err) = services.remove_trusted_device(user.id, device_id).await {
            self.toasts.push(Toast::error("Error", err.user_message()));
            return Err(err);
        }

        info!("Removed trusted device {} for {}", device_id, user.id);
        self.toasts.push(Toast::success(
            "Device removed",
            "The device will need to verify again on its next sign-in.",
        ));
        Ok(())
    }

    /// One page of the signed-in user's login history
    ///
    /// # Errors
    ///
    /// Fails for page 0, when nobody is signed in, or when the fetch fails.
    pub async fn login_history<S>(
        &self,
        services: &S,
        page: u32,
    ) -> PageResult<Page<LoginHistoryEntry>>
    where
        S: AuthService + LoginHistoryService + ?Sized,
    {
        Self::check_page(page)?;
        let user = services.current_user().await?;
        let rows = services
            .login_history(
                user.id,
                Page::<LoginHistoryEntry>::offset(page, self.page_size),
                u64::from(self.page_size) + 1,
            )
            .await?;

        Ok(Page::from_lookahead(rows, page, self.page_size))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use crate::notify::ToastKind;
    use calltrack_core::types::CurrentUser;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn config() -> SecurityConfig {
        SecurityConfig::default()
    }

    fn signed_in() -> MockBackend {
        MockBackend::new().with_user(CurrentUser {
            id: Uuid::new_v4(),
            email: Some("rep@example.com".to_string()),
        })
    }

    async fn in_setup(backend: &MockBackend) -> SecuritySettings {
        let mut settings = SecuritySettings::load(&config(), backend).await.unwrap();
        settings.begin_setup(backend).await.unwrap();
        settings
    }

    #[tokio::test]
    async fn test_full_enable_disable_cycle() {
        let backend = signed_in();
        let mut settings = SecuritySettings::load(&config(), &backend).await.unwrap();
        assert_eq!(settings.state(), &TwoFactorState::Disabled);

        let setup = settings.begin_setup(&backend).await.unwrap();
        assert_eq!(setup.backup_codes.len(), 10);
        assert!(setup.qr_code_url.starts_with("otpauth://"));

        settings.enable(&backend, "123 456").await.unwrap();
        assert_eq!(settings.state(), &TwoFactorState::Enabled);
        assert!(backend.two_factor_is_enabled());

        settings.disable(&backend).await.unwrap();
        assert_eq!(settings.state(), &TwoFactorState::Disabled);
        assert!(!backend.two_factor_is_enabled());

        let toasts = settings.take_toasts();
        assert_eq!(toasts.len(), 2);
        assert!(toasts.iter().all(|t| t.kind == ToastKind::Success));
    }

    #[rstest]
    #[case::five_digits("12345")]
    #[case::seven_digits("1234567")]
    #[case::letters_only("abcdef")]
    #[case::five_digits_padded(" 12-34 5 ")]
    #[tokio::test]
    async fn test_malformed_code_rejected_before_backend(#[case] code: &str) {
        let backend = signed_in();
        let mut settings = in_setup(&backend).await;
        let calls_before = backend.remote_calls();

        let error = settings.enable(&backend, code).await.unwrap_err();

        assert!(matches!(error, PageError::Validation { ref field, .. } if field == "code"));
        assert_eq!(backend.remote_calls(), calls_before);
        assert_eq!(backend.calls_to("enable_two_factor"), 0);
        assert!(matches!(settings.state(), TwoFactorState::SetupInProgress { .. }));
    }

    #[tokio::test]
    async fn test_wrong_code_stays_in_setup() {
        let backend = signed_in();
        let mut settings = in_setup(&backend).await;

        let error = settings.enable(&backend, "654321").await.unwrap_err();
        assert_eq!(error.user_message(), "Invalid verification code");
        assert_eq!(backend.calls_to("enable_two_factor"), 1);
        assert!(matches!(settings.state(), TwoFactorState::SetupInProgress { .. }));
        assert_eq!(settings.take_toasts()[0].kind, ToastKind::Error);
    }

    #[tokio::test]
    async fn test_enable_without_setup_is_rejected() {
        let backend = signed_in();
        let mut settings = SecuritySettings::new(&config(), TwoFactorState::Disabled);

        let error = settings.enable(&backend, "123456").await.unwrap_err();
        assert!(matches!(error, PageError::InvalidState { .. }));
        assert_eq!(backend.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_cancel_returns_to_disabled_locally() {
        let backend = signed_in();
        let mut settings = in_setup(&backend).await;
        let calls_before = backend.remote_calls();

        settings.cancel_setup();
        assert_eq!(settings.state(), &TwoFactorState::Disabled);
        assert!(settings.backup_codes_text().is_none());
        assert_eq!(backend.remote_calls(), calls_before);
    }

    #[tokio::test]
    async fn test_backup_codes_export() {
        let backend = signed_in();
        let settings = in_setup(&backend).await;

        let text = settings.backup_codes_text().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "BACKUP-0001");
        assert!(text.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_load_resumes_pending_setup() {
        let backend = signed_in();
        let _ = in_setup(&backend).await;

        let mut resumed = SecuritySettings::load(&config(), &backend).await.unwrap();
        assert_eq!(
            resumed.state(),
            &TwoFactorState::SetupInProgress { setup: None }
        );
        assert!(resumed.backup_codes_text().is_none());

        resumed.enable(&backend, "123456").await.unwrap();
        assert_eq!(resumed.state(), &TwoFactorState::Enabled);
    }

    #[tokio::test]
    async fn test_setup_refused_when_enabled() {
        let backend = signed_in().with_two_factor_enabled();
        let mut settings = SecuritySettings::load(&config(), &backend).await.unwrap();

        assert!(settings.begin_setup(&backend).await.is_err());
        assert_eq!(backend.calls_to("setup_two_factor"), 0);
    }

    #[tokio::test]
    async fn test_disable_when_off_is_rejected() {
        let backend = signed_in();
        let mut settings = SecuritySettings::new(&config(), TwoFactorState::Disabled);

        assert!(matches!(
            settings.disable(&backend).await,
            Err(PageError::InvalidState { .. })
        ));
        assert_eq!(backend.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_login_history_pages_of_twenty() {
        let now = Utc::now();
        let backend = (0..45).fold(signed_in(), |backend, i| {
            backend.with_login(LoginHistoryEntry {
                id: Uuid::new_v4(),
                ip_address: Some("203.0.113.7".to_string()),
                user_agent: Some("Mozilla/5.0".to_string()),
                location: None,
                success: i % 5 != 0,
                created_at: now - Duration::minutes(i),
            })
        });
        let settings = SecuritySettings::new(&config(), TwoFactorState::Disabled);

        let first = settings.login_history(&backend, 1).await.unwrap();
        assert_eq!(first.items.len(), 20);
        assert!(first.has_more);
        assert_eq!(first.items[0].created_at, now);

        let last = settings.login_history(&backend, 3).await.unwrap();
        assert_eq!(last.items.len(), 5);
        assert!(!last.has_more);
    }

    #[tokio::test]
    async fn test_page_zero_is_rejected() {
        let backend = signed_in();
        let settings = SecuritySettings::new(&config(), TwoFactorState::Disabled);

        assert!(settings.devices(&backend, 0).await.unwrap_err().is_local());
        assert_eq!(backend.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_remove_device() {
        let now = Utc::now();
        let keep = Uuid::new_v4();
        let stale = Uuid::new_v4();
        let backend = signed_in()
            .with_device(TrustedDevice {
                id: keep,
                device_name: "Work laptop".to_string(),
                last_used_at: Some(now),
                created_at: now - Duration::days(30),
            })
            .with_device(TrustedDevice {
                id: stale,
                device_name: "Old phone".to_string(),
                last_used_at: None,
                created_at: now - Duration::days(300),
            });
        let mut settings = SecuritySettings::new(&config(), TwoFactorState::Disabled);

        settings.remove_device(&backend, stale).await.unwrap();

        let page = settings.devices(&backend, 1).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, keep);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_paginated_reads_ignore_two_factor_state() {
        let backend = signed_in().with_two_factor_enabled();
        let settings = SecuritySettings::new(&config(), TwoFactorState::Enabled);

        let devices = settings.devices(&backend, 1).await.unwrap();
        assert!(devices.items.is_empty());
        assert_eq!(devices.page_size, 20);
    }
}
