//! Data models for the application.
//!
//! These models represent the core entities stored in the SQLite database
//! and the JSON bodies exchanged over HTTP.

pub mod dto;
pub mod pull_request;
pub mod team;
pub mod user;

// Re-exports for convenient access
pub use pull_request::{timestamp_now, PrStatus, PullRequest, MAX_REVIEWERS};
pub use team::{Team, TeamMember};
pub use user::User;
