//! SQLite-backed implementation of the store traits.

use async_trait::async_trait;

use super::store::{PrStore, TeamStore, UserStore};
use crate::db::pool::DbPool;
use crate::db::{pull_requests, teams, users};
use crate::error::AppError;
use crate::models::{PullRequest, Team, User};

/// Stores backed by a shared SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamStore for SqliteStore {
    async fn create(&self, team: &Team) -> Result<(), AppError> {
        teams::insert_team(&self.pool, &team.team_name).await
    }

    async fn get_by_name(&self, team_name: &str) -> Result<Option<Team>, AppError> {
        teams::get_team(&self.pool, team_name).await
    }

    async fn exists(&self, team_name: &str) -> Result<bool, AppError> {
        teams::team_exists(&self.pool, team_name).await
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn create(&self, user: &User) -> Result<(), AppError> {
        users::insert_user(&self.pool, user).await
    }

    async fn update(&self, user: &User) -> Result<(), AppError> {
        users::update_user(&self.pool, user).await
    }

    async fn get_by_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        users::get_user(&self.pool, user_id).await
    }

    async fn get_by_team_name(&self, team_name: &str) -> Result<Vec<User>, AppError> {
        users::get_users_by_team(&self.pool, team_name).await
    }

    async fn exists(&self, user_id: &str) -> Result<bool, AppError> {
        users::user_exists(&self.pool, user_id).await
    }
}

#[async_trait]
impl PrStore for SqliteStore {
    async fn create(&self, pr: &PullRequest) -> Result<(), AppError> {
        pull_requests::insert_pull_request(&self.pool, pr).await
    }

    async fn update(&self, pr: &PullRequest) -> Result<(), AppError> {
        pull_requests::update_pull_request(&self.pool, pr).await
    }

    async fn get_by_id(&self, pr_id: &str) -> Result<Option<PullRequest>, AppError> {
        pull_requests::get_pull_request(&self.pool, pr_id).await
    }

    async fn get_by_reviewer_id(&self, user_id: &str) -> Result<Vec<PullRequest>, AppError> {
        pull_requests::get_pull_requests_by_reviewer(&self.pool, user_id).await
    }

    async fn exists(&self, pr_id: &str) -> Result<bool, AppError> {
        pull_requests::pull_request_exists(&self.pool, pr_id).await
    }
}
