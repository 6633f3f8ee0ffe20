//! Invitation acceptance page
//!
//! ```text
//! validating -> invalid
//!            -> valid -> submitting -> success
//!                                   -> valid (retry)
//! ```

use crate::error::{PageError, PageResult};
use crate::notify::{Toast, Toasts};
use crate::service::InvitationService;
use calltrack_core::types::InvitationDetails;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Shortest accepted password, in UTF-16 code units
///
/// Characters outside the Basic Multilingual Plane count twice, the way the
/// browser form measures `password.length`.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Where the invitee is sent after accepting
pub const INVITED_REDIRECT: &str = "/auth?invited=true";

const INVALID_LINK_MESSAGE: &str = "This invitation link is invalid or has expired.";

/// Where the acceptance flow currently is
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InvitationState {
    /// Token is being checked
    Validating,
    /// Token is missing or rejected; the page cannot continue
    Invalid {
        /// Why
        message: String,
    },
    /// Token checked out; the form is open
    Valid {
        /// Invitation the form is for
        details: InvitationDetails,
    },
    /// Acceptance request in flight
    Submitting {
        /// Invitation being accepted
        details: InvitationDetails,
    },
    /// Account created
    Success {
        /// Navigation target
        redirect_to: String,
    },
}

/// Fields of the acceptance form
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AcceptForm {
    /// Invitee's full name
    pub full_name: String,
    /// Chosen password
    pub password: String,
    /// Password typed again
    pub confirm_password: String,
}

impl AcceptForm {
    /// Run the local checks in order and report the first failure
    ///
    /// # Errors
    ///
    /// Returns a validation error for the name, password or confirmation.
    pub fn validate(&self) -> PageResult<()> {
        if self.full_name.trim().is_empty() {
            return Err(PageError::validation(
                "full_name",
                "Please enter your full name",
            ));
        }
        if self.password.encode_utf16().count() < MIN_PASSWORD_LENGTH {
            return Err(PageError::validation(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            ));
        }
        if self.password != self.confirm_password {
            return Err(PageError::validation(
                "confirm_password",
                "Passwords do not match",
            ));
        }
        Ok(())
    }
}

/// Controller for one visit to the invitation page
#[derive(Debug, Clone)]
pub struct InvitationFlow {
    token: Option<String>,
    state: InvitationState,
    toasts: Toasts,
}

impl InvitationFlow {
    /// Start the flow for the token in the page URL
    pub fn new(token: Option<&str>) -> Self {
        Self {
            token: token
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            state: InvitationState::Validating,
            toasts: Toasts::default(),
        }
    }

    /// Current state
    pub const fn state(&self) -> &InvitationState {
        &self.state
    }

    /// Invitee email, read-only in the form
    pub fn email(&self) -> Option<&str> {
        match &self.state {
            InvitationState::Valid { details } | InvitationState::Submitting { details } => {
                Some(&details.email)
            }
            _ => None,
        }
    }

    /// Take the queued toasts
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        self.toasts.drain()
    }

    /// Check the token with the backend
    ///
    /// A missing token goes straight to `Invalid` without a backend call.
    pub async fn validate<S>(&mut self, services: &S) -> &InvitationState
    where
        S: InvitationService + ?Sized,
    {
        let Some(token) = self.token.as_deref() else {
            self.state = InvitationState::Invalid {
                message: "No invitation token provided.".to_string(),
            };
            return &self.state;
        };

        self.state = match services.validate_invitation(token).await {
            Ok(details) => {
                info!("Invitation for {} is valid", details.email);
                InvitationState::Valid { details }
            }
            Err(err) => {
                warn!("Invitation token rejected: {}", err);
                let message = match err {
                    PageError::Remote { message: None, .. } | PageError::Internal(_) => {
                        INVALID_LINK_MESSAGE.to_string()
                    }
                    other => other.user_message(),
                };
                InvitationState::Invalid { message }
            }
        };

        &self.state
    }

    /// Submit the form
    ///
    /// Local checks run first; the backend is only called when they all pass.
    /// A backend failure queues an error toast and reopens the form.
    ///
    /// # Errors
    ///
    /// Returns the failed check, an invalid-state error when the form is not
    /// open, or the backend error.
    pub async fn submit<S>(&mut self, services: &S, form: &AcceptForm) -> PageResult<&InvitationState>
    where
        S: InvitationService + ?Sized,
    {
        let (InvitationState::Valid { details }, Some(token)) = (&self.state, &self.token) else {
            return Err(PageError::invalid_state(
                "The invitation form is not open",
            ));
        };
        let details = details.clone();
        let token = token.clone();

        form.validate()?;

        self.state = InvitationState::Submitting {
            details: details.clone(),
        };

        match services
            .accept_invitation(&token, form.full_name.trim(), &form.password)
            .await
        {
            Ok(()) => {
                info!("Invitation accepted for {}", details.email);
                self.toasts.push(Toast::success(
                    "Welcome aboard",
                    "Your account has been created. Please sign in.",
                ));
                self.state = InvitationState::Success {
                    redirect_to: INVITED_REDIRECT.to_string(),
                };
                Ok(&self.state)
            }
            Err(err) => {
                warn!("Accepting invitation for {} failed: {}", details.email, err);
                self.toasts.push(Toast::error("Error", err.user_message()));
                self.state = InvitationState::Valid { details };
                Err(err)
            }
        }
    }
}
