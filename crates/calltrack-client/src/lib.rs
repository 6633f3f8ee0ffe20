//! Remote data client for calltrack
//!
//! A thin typed layer over the hosted store's REST interface: filtered row
//! reads, deletes, remote procedure calls and the authenticated-user lookup.
//! Table and procedure names used by the pages live in [`tables`] and
//! [`procedures`].

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod client;
pub mod error;

pub use client::{Order, RemoteClient, RowQuery};
pub use error::{ClientError, ClientResult};

/// Tables read by the pages
pub mod tables {
    /// Recorded sales calls
    pub const CALL_RECORDS: &str = "call_records";
    /// Booked appointments
    pub const APPOINTMENTS: &str = "appointments";
    /// User profiles
    pub const PROFILES: &str = "profiles";
    /// Sign-in attempts
    pub const LOGIN_HISTORY: &str = "login_history";
    /// Remembered devices
    pub const TRUSTED_DEVICES: &str = "trusted_devices";
}

/// Remote procedures called by the pages
pub mod procedures {
    /// Check an invitation token and return the invitation
    pub const VALIDATE_INVITATION: &str = "validate_invitation";
    /// Create the invitee's account
    pub const ACCEPT_INVITATION: &str = "accept_invitation";
    /// Whether two-factor authentication is on
    pub const TWO_FACTOR_STATUS: &str = "two_factor_status";
    /// Start two-factor setup
    pub const SETUP_TWO_FACTOR: &str = "setup_two_factor";
    /// Verify a code against the pending setup and turn 2FA on
    pub const ENABLE_TWO_FACTOR: &str = "enable_two_factor";
    /// Turn 2FA off
    pub const DISABLE_TWO_FACTOR: &str = "disable_two_factor";
}
