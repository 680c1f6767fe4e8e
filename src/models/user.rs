//! User model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A person who can author pull requests and review them.
///
/// A user belongs to at most one team at a time through `team_name`;
/// moving a user to another team is a plain overwrite of that field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub user_id: String,

    /// Display name.
    pub username: String,

    /// Name of the team the user currently belongs to.
    pub team_name: String,

    /// Whether the user may receive new review assignments.
    pub is_active: bool,
}

impl User {
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        team_name: impl Into<String>,
        is_active: bool,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            team_name: team_name.into(),
            is_active,
        }
    }

    /// Update the active flag only. Existing review assignments are kept.
    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
    }
}
