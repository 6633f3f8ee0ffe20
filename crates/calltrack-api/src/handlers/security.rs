//! Security settings endpoints: two-factor authentication, trusted devices
//! and login history
//!
//! Every request rebuilds the controller from the backend's 2FA status, so
//! the state machine holds across stateless requests.

use crate::error::{ApiError, ApiResult};
use crate::extractors::{PageQuery, SignedIn, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::Json,
};
use calltrack_core::types::{LoginHistoryEntry, Page, TrustedDevice, TwoFactorSetup};
use calltrack_core::utils::parse_otp_code;
use calltrack_pages::{PageError, SecuritySettings, Services, Toast, TwoFactorState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 2FA state plus whatever the last action produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoFactorResponse {
    /// Current state
    #[serde(flatten)]
    pub state: TwoFactorState,
    /// Backup codes as a downloadable text file, right after setup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_codes_text: Option<String>,
    /// Notifications for the page
    pub toasts: Vec<Toast>,
}

impl TwoFactorResponse {
    fn from_settings(settings: &mut SecuritySettings) -> Self {
        Self {
            state: settings.state().clone(),
            backup_codes_text: settings.backup_codes_text(),
            toasts: settings.take_toasts(),
        }
    }
}

/// Body of `POST /api/security/2fa/enable`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EnableTwoFactorRequest {
    /// Code from the authenticator app, separators allowed
    #[validate(length(min = 1, max = 64))]
    pub code: String,
}

/// Outcome of a device removal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRemovedResponse {
    /// The removed device
    pub id: Uuid,
    /// Notifications for the page
    pub toasts: Vec<Toast>,
}

async fn load_settings(
    state: &AppState,
    services: &dyn Services,
) -> Result<SecuritySettings, PageError> {
    SecuritySettings::load(&state.config.security, services).await
}

/// Controller for the read-only tables, which do not depend on the 2FA state
fn table_settings(state: &AppState) -> SecuritySettings {
    SecuritySettings::new(&state.config.security, TwoFactorState::Disabled)
}

/// `GET /api/security/2fa`
///
/// # Errors
///
/// Returns 401 without a session and 502 when the backend fails.
pub async fn get_two_factor(
    State(state): State<Arc<AppState>>,
    SignedIn(token): SignedIn,
) -> ApiResult<Json<TwoFactorResponse>> {
    let services = state.services(Some(&token));
    let mut settings = load_settings(&state, services.as_ref()).await?;

    Ok(Json(TwoFactorResponse::from_settings(&mut settings)))
}

/// `POST /api/security/2fa/setup`
///
/// Issues the secret, the QR code URL and the backup codes. They are only
/// ever returned by this call.
///
/// # Errors
///
/// Returns 409 when 2FA is already on.
pub async fn setup_two_factor(
    State(state): State<Arc<AppState>>,
    SignedIn(token): SignedIn,
) -> ApiResult<Json<SetupResponse>> {
    let services = state.services(Some(&token));
    let mut settings = load_settings(&state, services.as_ref()).await?;
    let setup = settings.begin_setup(services.as_ref()).await?.clone();

    Ok(Json(SetupResponse {
        setup,
        two_factor: TwoFactorResponse::from_settings(&mut settings),
    }))
}

/// Response of `POST /api/security/2fa/setup`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupResponse {
    /// Secret, QR code URL and backup codes
    pub setup: TwoFactorSetup,
    /// State after the setup started
    #[serde(flatten)]
    pub two_factor: TwoFactorResponse,
}

/// `POST /api/security/2fa/enable`
///
/// The code is checked for shape before the backend is contacted at all.
///
/// # Errors
///
/// Returns 400 for a malformed or rejected code and 409 when no setup is in
/// progress.
pub async fn enable_two_factor(
    State(state): State<Arc<AppState>>,
    SignedIn(token): SignedIn,
    ValidatedJson(request): ValidatedJson<EnableTwoFactorRequest>,
) -> ApiResult<Json<TwoFactorResponse>> {
    let code = parse_otp_code(&request.code, state.config.security.otp_digits)
        .map_err(PageError::from)?;

    let services = state.services(Some(&token));
    let mut settings = load_settings(&state, services.as_ref()).await?;
    settings.enable(services.as_ref(), &code).await?;

    Ok(Json(TwoFactorResponse::from_settings(&mut settings)))
}

/// `POST /api/security/2fa/disable`
///
/// # Errors
///
/// Returns 409 when 2FA is not on.
pub async fn disable_two_factor(
    State(state): State<Arc<AppState>>,
    SignedIn(token): SignedIn,
) -> ApiResult<Json<TwoFactorResponse>> {
    let services = state.services(Some(&token));
    let mut settings = load_settings(&state, services.as_ref()).await?;
    settings.disable(services.as_ref()).await?;

    Ok(Json(TwoFactorResponse::from_settings(&mut settings)))
}

/// `GET /api/security/devices?page=`
///
/// # Errors
///
/// Returns 401 without a session and 502 when the backend fails.
pub async fn list_devices(
    State(state): State<Arc<AppState>>,
    SignedIn(token): SignedIn,
    query: PageQuery,
) -> ApiResult<Json<Page<TrustedDevice>>> {
    let services = state.services(Some(&token));
    let page = table_settings(&state)
        .devices(services.as_ref(), query.page())
        .await?;

    Ok(Json(page))
}

/// `DELETE /api/security/devices/:id`
///
/// # Errors
///
/// Returns 400 for a malformed id and the mapped backend error when the
/// delete fails.
pub async fn remove_device(
    State(state): State<Arc<AppState>>,
    SignedIn(token): SignedIn,
    Path(id): Path<String>,
) -> ApiResult<Json<DeviceRemovedResponse>> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::bad_request("Invalid device id"))?;

    let services = state.services(Some(&token));
    let mut settings = table_settings(&state);
    settings.remove_device(services.as_ref(), id).await?;

    Ok(Json(DeviceRemovedResponse {
        id,
        toasts: settings.take_toasts(),
    }))
}

/// `GET /api/security/login-history?page=`
///
/// # Errors
///
/// Returns 401 without a session and 502 when the backend fails.
pub async fn list_login_history(
    State(state): State<Arc<AppState>>,
    SignedIn(token): SignedIn,
    query: PageQuery,
) -> ApiResult<Json<Page<LoginHistoryEntry>>> {
    let services = state.services(Some(&token));
    let page = table_settings(&state)
        .login_history(services.as_ref(), query.page())
        .await?;

    Ok(Json(page))
}
