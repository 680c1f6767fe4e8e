//! PR reviewer assignment service.
//!
//! Teams register their members; opening a pull request assigns up to two
//! random active reviewers from the author's team, reviewers can be swapped
//! while the PR is open, and merging freezes the PR.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

use crate::config::AppConfig;
use error::AppError;
use services::{ReviewService, ReviewerAssigner, SqliteStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Open the database and serve the API until `cancel_token` fires.
pub async fn run(config: AppConfig, cancel_token: CancellationToken) -> Result<(), AppError> {
    let addr = config.bind_addr()?;

    let pool = db::initialize(&config.db_path, config.db_max_connections).await?;
    let store = Arc::new(SqliteStore::new(pool.clone()));
    let service = Arc::new(ReviewService::with_store(store, ReviewerAssigner::new()));

    let result = services::http_server::serve(addr, service, cancel_token)
        .await
        .map_err(AppError::internal);

    pool.close().await;
    log::info!("[db] Connection pool closed");

    result
}
