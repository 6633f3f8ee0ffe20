//! Page controllers for calltrack
//!
//! Each page (activity log, leaderboard, invitation acceptance and security
//! settings) is a small controller that talks to the backend only through
//! the traits in [`service`]. [`remote`] binds those traits to
//! [`calltrack_client::RemoteClient`]; [`mock`] provides an in-memory
//! backend for tests.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod activity_log;
pub mod error;
pub mod invitation;
pub mod leaderboard;
pub mod mock;
pub mod notify;
pub mod remote;
pub mod security;
pub mod service;

pub use activity_log::{ActivityLog, ActivityLogView, ActivityRow};
pub use error::{GENERIC_ERROR_MESSAGE, PageError, PageResult};
pub use invitation::{AcceptForm, InvitationFlow, InvitationState};
pub use leaderboard::{LeaderboardView, load_leaderboard};
pub use mock::MockBackend;
pub use notify::{Toast, ToastKind};
pub use security::{SecuritySettings, TwoFactorState};
pub use service::{Connector, Services};
