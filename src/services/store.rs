//! Storage abstractions consumed by the review service.
//!
//! The traits split persistence into three capability sets so that the
//! orchestration layer can run against SQLite in production and against
//! the in-memory store in tests. Lookups return `Ok(None)` for missing
//! entities; deciding whether that is an error is up to the caller.

use crate::error::AppError;
use crate::models::{PullRequest, Team, User};
use async_trait::async_trait;

/// Team registry.
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Register a team name. Fails with `TeamExists` if it is taken.
    async fn create(&self, team: &Team) -> Result<(), AppError>;

    /// Load a team together with its current roster.
    async fn get_by_name(&self, team_name: &str) -> Result<Option<Team>, AppError>;

    async fn exists(&self, team_name: &str) -> Result<bool, AppError>;
}

/// User records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), AppError>;

    /// Overwrite name, team and active flag of an existing user.
    async fn update(&self, user: &User) -> Result<(), AppError>;

    async fn get_by_id(&self, user_id: &str) -> Result<Option<User>, AppError>;

    async fn get_by_team_name(&self, team_name: &str) -> Result<Vec<User>, AppError>;

    async fn exists(&self, user_id: &str) -> Result<bool, AppError>;
}

/// Pull request records.
#[async_trait]
pub trait PrStore: Send + Sync {
    /// Insert a new PR with its reviewers. Fails with `PrExists` if the id is taken.
    async fn create(&self, pr: &PullRequest) -> Result<(), AppError>;

    /// Persist status, merge time and the full reviewer list atomically.
    async fn update(&self, pr: &PullRequest) -> Result<(), AppError>;

    async fn get_by_id(&self, pr_id: &str) -> Result<Option<PullRequest>, AppError>;

    /// PRs where the user is a current reviewer, newest first.
    async fn get_by_reviewer_id(&self, user_id: &str) -> Result<Vec<PullRequest>, AppError>;

    async fn exists(&self, pr_id: &str) -> Result<bool, AppError>;
}
