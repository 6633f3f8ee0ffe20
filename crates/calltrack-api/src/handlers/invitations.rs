//! Invitation acceptance endpoints
//!
//! Both endpoints work without a session: the invitee has no account yet.

use crate::error::ApiResult;
use crate::extractors::ValidatedJson;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Json,
};
use calltrack_pages::{AcceptForm, InvitationFlow, InvitationState, PageError, Toast};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

/// Body of `POST /api/invitations/accept`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AcceptInvitationRequest {
    /// Token from the invitation link
    #[validate(length(max = 512))]
    pub token: String,
    /// Invitee's full name
    #[serde(default)]
    pub full_name: String,
    /// Chosen password
    #[serde(default)]
    pub password: String,
    /// Password typed again
    #[serde(default)]
    pub confirm_password: String,
}

/// Query of `GET /api/invitations/validate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvitationQuery {
    /// Token from the invitation link
    pub token: Option<String>,
}

/// Result of an acceptance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationResponse {
    /// Where the flow ended up
    #[serde(flatten)]
    pub state: InvitationState,
    /// Notifications for the page
    pub toasts: Vec<Toast>,
}

/// `GET /api/invitations/validate?token=`
///
/// Always 200: a missing or unusable token is reported as the `invalid`
/// state. A missing token is never sent to the backend.
pub async fn validate_invitation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InvitationQuery>,
) -> Json<InvitationState> {
    let services = state.services(None);
    let mut flow = InvitationFlow::new(query.token.as_deref());

    Json(flow.validate(services.as_ref()).await.clone())
}

/// `POST /api/invitations/accept`
///
/// The form checks run before anything is sent to the backend, then the
/// token is re-validated and the account created.
///
/// # Errors
///
/// Returns 400 for a failed form check or an unusable token, and the mapped
/// backend error when account creation fails.
pub async fn accept_invitation(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<AcceptInvitationRequest>,
) -> ApiResult<Json<InvitationResponse>> {
    let form = AcceptForm {
        full_name: request.full_name,
        password: request.password,
        confirm_password: request.confirm_password,
    };
    form.validate()?;

    let services = state.services(None);
    let mut flow = InvitationFlow::new(Some(&request.token));

    if let InvitationState::Invalid { message } = flow.validate(services.as_ref()).await {
        debug!("Refusing acceptance for an unusable token");
        return Err(PageError::invalid_token(message.clone()).into());
    }

    let state = flow.submit(services.as_ref(), &form).await?.clone();

    Ok(Json(InvitationResponse {
        state,
        toasts: flow.take_toasts(),
    }))
}
