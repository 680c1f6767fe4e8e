//! User queries.

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::User;

pub async fn insert_user(pool: &DbPool, user: &User) -> Result<(), AppError> {
    sqlx::query("INSERT INTO users (user_id, username, team_name, is_active) VALUES (?, ?, ?, ?)")
        .bind(&user.user_id)
        .bind(&user.username)
        .bind(&user.team_name)
        .bind(user.is_active)
        .execute(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::invalid_input_field(
                    format!("user {} already exists", user.user_id),
                    "user_id",
                )
            }
            other => AppError::database_with_op(other.to_string(), "insert_user"),
        })?;

    Ok(())
}

/// Overwrite username, team and active flag.
pub async fn update_user(pool: &DbPool, user: &User) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE users SET username = ?, team_name = ?, is_active = ? WHERE user_id = ?",
    )
    .bind(&user.username)
    .bind(&user.team_name)
    .bind(user.is_active)
    .bind(&user.user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found_with_id("User", &user.user_id));
    }

    Ok(())
}

pub async fn get_user(pool: &DbPool, user_id: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_users_by_team(pool: &DbPool, team_name: &str) -> Result<Vec<User>, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, username, team_name, is_active
        FROM users
        WHERE team_name = ?
        ORDER BY user_id
        "#,
    )
    .bind(team_name)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

pub async fn user_exists(pool: &DbPool, user_id: &str) -> Result<bool, AppError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}
