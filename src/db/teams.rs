//! Team queries.

use crate::db::pool::DbPool;
use crate::db::users;
use crate::error::AppError;
use crate::models::Team;

/// Register a team name. A taken name maps to `TeamExists`.
pub async fn insert_team(pool: &DbPool, team_name: &str) -> Result<(), AppError> {
    sqlx::query("INSERT INTO teams (team_name) VALUES (?)")
        .bind(team_name)
        .execute(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::team_exists(team_name)
            }
            other => AppError::database_with_op(other.to_string(), "insert_team"),
        })?;

    Ok(())
}

/// Load a team and its current members, ordered by user id.
pub async fn get_team(pool: &DbPool, team_name: &str) -> Result<Option<Team>, AppError> {
    if !team_exists(pool, team_name).await? {
        return Ok(None);
    }

    let members = users::get_users_by_team(pool, team_name).await?;
    Ok(Some(Team::new(team_name, members)))
}

pub async fn team_exists(pool: &DbPool, team_name: &str) -> Result<bool, AppError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM teams WHERE team_name = ?")
        .bind(team_name)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}
