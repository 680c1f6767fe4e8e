//! Pull request queries.
//!
//! A PR row and its reviewer rows are always written together inside one
//! transaction, so readers never observe a half-updated reviewer list.

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::{PrStatus, PullRequest};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Sqlite, Transaction};

/// Raw `pull_requests` row.
#[derive(Debug, FromRow)]
struct PullRequestRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
    created_at: i64,
    merged_at: Option<i64>,
}

impl PullRequestRow {
    fn into_model(self, reviewers: Vec<String>) -> Result<PullRequest, AppError> {
        Ok(PullRequest {
            id: self.pull_request_id,
            name: self.pull_request_name,
            author_id: self.author_id,
            status: PrStatus::from(self.status.as_str()),
            assigned_reviewers: reviewers,
            created_at: from_millis(self.created_at)?,
            merged_at: self.merged_at.map(from_millis).transpose()?,
        })
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| AppError::database(format!("invalid timestamp {}", ms)))
}

/// Insert a PR and its reviewers. A taken id maps to `PrExists`.
pub async fn insert_pull_request(pool: &DbPool, pr: &PullRequest) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO pull_requests
            (pull_request_id, pull_request_name, author_id, status, created_at, merged_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&pr.id)
    .bind(&pr.name)
    .bind(&pr.author_id)
    .bind(pr.status.to_string())
    .bind(pr.created_at.timestamp_millis())
    .bind(pr.merged_at.map(|t| t.timestamp_millis()))
    .execute(&mut *tx)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::pr_exists(&pr.id),
        other => AppError::database_with_op(other.to_string(), "insert_pull_request"),
    })?;

    insert_reviewers(&mut tx, &pr.id, &pr.assigned_reviewers).await?;

    tx.commit().await?;
    Ok(())
}

/// Persist status, merge time and the full reviewer list.
pub async fn update_pull_request(pool: &DbPool, pr: &PullRequest) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE pull_requests
        SET pull_request_name = ?, status = ?, merged_at = ?
        WHERE pull_request_id = ?
        "#,
    )
    .bind(&pr.name)
    .bind(pr.status.to_string())
    .bind(pr.merged_at.map(|t| t.timestamp_millis()))
    .bind(&pr.id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found_with_id("PullRequest", &pr.id));
    }

    sqlx::query("DELETE FROM pr_reviewers WHERE pull_request_id = ?")
        .bind(&pr.id)
        .execute(&mut *tx)
        .await?;

    insert_reviewers(&mut tx, &pr.id, &pr.assigned_reviewers).await?;

    tx.commit().await?;
    Ok(())
}

async fn insert_reviewers(
    tx: &mut Transaction<'_, Sqlite>,
    pr_id: &str,
    reviewers: &[String],
) -> Result<(), AppError> {
    for (position, reviewer_id) in reviewers.iter().enumerate() {
        sqlx::query(
            "INSERT INTO pr_reviewers (pull_request_id, reviewer_id, position) VALUES (?, ?, ?)",
        )
        .bind(pr_id)
        .bind(reviewer_id)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn get_reviewers(pool: &DbPool, pr_id: &str) -> Result<Vec<String>, AppError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT reviewer_id FROM pr_reviewers WHERE pull_request_id = ? ORDER BY position",
    )
    .bind(pr_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

pub async fn get_pull_request(pool: &DbPool, pr_id: &str) -> Result<Option<PullRequest>, AppError> {
    let row = sqlx::query_as::<_, PullRequestRow>(
        r#"
        SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
        FROM pull_requests
        WHERE pull_request_id = ?
        "#,
    )
    .bind(pr_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let reviewers = get_reviewers(pool, pr_id).await?;
            Ok(Some(row.into_model(reviewers)?))
        }
        None => Ok(None),
    }
}

/// PRs on which `user_id` is a current reviewer, newest first.
pub async fn get_pull_requests_by_reviewer(
    pool: &DbPool,
    user_id: &str,
) -> Result<Vec<PullRequest>, AppError> {
    let rows = sqlx::query_as::<_, PullRequestRow>(
        r#"
        SELECT pr.pull_request_id, pr.pull_request_name, pr.author_id,
               pr.status, pr.created_at, pr.merged_at
        FROM pull_requests pr
        JOIN pr_reviewers r ON r.pull_request_id = pr.pull_request_id
        WHERE r.reviewer_id = ?
        ORDER BY pr.created_at DESC, pr.rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut prs = Vec::with_capacity(rows.len());
    for row in rows {
        let reviewers = get_reviewers(pool, &row.pull_request_id).await?;
        prs.push(row.into_model(reviewers)?);
    }
    Ok(prs)
}

pub async fn pull_request_exists(pool: &DbPool, pr_id: &str) -> Result<bool, AppError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM pull_requests WHERE pull_request_id = ?")
        .bind(pr_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}
