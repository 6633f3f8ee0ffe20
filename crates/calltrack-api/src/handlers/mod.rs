//! Request handlers, one module per page

pub mod activity;
pub mod health;
pub mod invitations;
pub mod leaderboard;
pub mod security;
