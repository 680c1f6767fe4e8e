//! Team model.

use super::User;
use serde::{Deserialize, Serialize};

/// A named group of users.
///
/// `members` is never maintained incrementally: it is filled from the users
/// whose `team_name` matches at the time the team is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_name: String,
    pub members: Vec<User>,
}

/// Member entry supplied when a team is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

impl TeamMember {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, is_active: bool) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            is_active,
        }
    }
}

impl From<&User> for TeamMember {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            is_active: user.is_active,
        }
    }
}

impl Team {
    pub fn new(team_name: impl Into<String>, members: Vec<User>) -> Self {
        Self {
            team_name: team_name.into(),
            members,
        }
    }

    /// Members eligible for new review assignments.
    pub fn active_members(&self) -> impl Iterator<Item = &User> {
        self.members.iter().filter(|m| m.is_active)
    }

    /// Active members other than `excluded_user_id`.
    pub fn active_members_excluding<'a>(
        &'a self,
        excluded_user_id: &'a str,
    ) -> impl Iterator<Item = &'a User> {
        self.active_members()
            .filter(move |m| m.user_id != excluded_user_id)
    }
}
