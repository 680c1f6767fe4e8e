//! In-memory implementation of the store traits.
//!
//! All state is held in `RwLock`-protected maps and lost on drop. Used by
//! unit tests and handy for running the service without a database file.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{PrStore, TeamStore, UserStore};
use crate::error::AppError;
use crate::models::{PullRequest, Team, User};

/// In-memory team, user and pull request storage.
#[derive(Default)]
pub struct InMemoryStore {
    teams: RwLock<HashSet<String>>,
    /// Keyed by user id; ordered so rosters come back in a stable order.
    users: RwLock<BTreeMap<String, User>>,
    /// PRs with their insertion sequence, used to break `created_at` ties.
    prs: RwLock<HashMap<String, (u64, PullRequest)>>,
    next_seq: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeamStore for InMemoryStore {
    async fn create(&self, team: &Team) -> Result<(), AppError> {
        let mut teams = self.teams.write().await;
        if !teams.insert(team.team_name.clone()) {
            return Err(AppError::team_exists(&team.team_name));
        }
        Ok(())
    }

    async fn get_by_name(&self, team_name: &str) -> Result<Option<Team>, AppError> {
        if !self.teams.read().await.contains(team_name) {
            return Ok(None);
        }
        let members = UserStore::get_by_team_name(self, team_name).await?;
        Ok(Some(Team::new(team_name, members)))
    }

    async fn exists(&self, team_name: &str) -> Result<bool, AppError> {
        Ok(self.teams.read().await.contains(team_name))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create(&self, user: &User) -> Result<(), AppError> {
        use std::collections::btree_map::Entry;

        let mut users = self.users.write().await;
        match users.entry(user.user_id.clone()) {
            Entry::Occupied(_) => Err(AppError::invalid_input_field(
                format!("user {} already exists", user.user_id),
                "user_id",
            )),
            Entry::Vacant(entry) => {
                entry.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let existing = users
            .get_mut(&user.user_id)
            .ok_or_else(|| AppError::not_found_with_id("User", &user.user_id))?;
        *existing = user.clone();
        Ok(())
    }

    async fn get_by_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn get_by_team_name(&self, team_name: &str) -> Result<Vec<User>, AppError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| u.team_name == team_name)
            .cloned()
            .collect())
    }

    async fn exists(&self, user_id: &str) -> Result<bool, AppError> {
        Ok(self.users.read().await.contains_key(user_id))
    }
}

#[async_trait]
impl PrStore for InMemoryStore {
    async fn create(&self, pr: &PullRequest) -> Result<(), AppError> {
        use std::collections::hash_map::Entry;

        let mut prs = self.prs.write().await;
        match prs.entry(pr.id.clone()) {
            Entry::Occupied(_) => Err(AppError::pr_exists(&pr.id)),
            Entry::Vacant(entry) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                entry.insert((seq, pr.clone()));
                Ok(())
            }
        }
    }

    async fn update(&self, pr: &PullRequest) -> Result<(), AppError> {
        let mut prs = self.prs.write().await;
        let (_, stored) = prs
            .get_mut(&pr.id)
            .ok_or_else(|| AppError::not_found_with_id("PullRequest", &pr.id))?;
        *stored = pr.clone();
        Ok(())
    }

    async fn get_by_id(&self, pr_id: &str) -> Result<Option<PullRequest>, AppError> {
        Ok(self.prs.read().await.get(pr_id).map(|(_, pr)| pr.clone()))
    }

    async fn get_by_reviewer_id(&self, user_id: &str) -> Result<Vec<PullRequest>, AppError> {
        let prs = self.prs.read().await;
        let mut matching: Vec<&(u64, PullRequest)> = prs
            .values()
            .filter(|(_, pr)| pr.has_reviewer(user_id))
            .collect();
        matching.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });
        Ok(matching.into_iter().map(|(_, pr)| pr.clone()).collect())
    }

    async fn exists(&self, pr_id: &str) -> Result<bool, AppError> {
        Ok(self.prs.read().await.contains_key(pr_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_team_roster_is_query_derived() {
        let store = InMemoryStore::new();
        TeamStore::create(&store, &Team::new("backend", vec![])).await.unwrap();
        UserStore::create(&store, &User::new("u2", "Bob", "backend", true)).await.unwrap();
        UserStore::create(&store, &User::new("u1", "Alice", "backend", true)).await.unwrap();
        UserStore::create(&store, &User::new("u3", "Carol", "frontend", true)).await.unwrap();

        let team = TeamStore::get_by_name(&store, "backend").await.unwrap().unwrap();
        let ids: Vec<&str> = team.members.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);

        // Moving a user only rewrites its team_name
        let mut moved = User::new("u2", "Bob", "frontend", true);
        UserStore::update(&store, &moved).await.unwrap();
        let team = TeamStore::get_by_name(&store, "backend").await.unwrap().unwrap();
        assert_eq!(team.members.len(), 1);

        moved.set_active(false);
        UserStore::update(&store, &moved).await.unwrap();
        let stored = UserStore::get_by_id(&store, "u2").await.unwrap().unwrap();
        assert!(!stored.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_creates_fail() {
        let store = InMemoryStore::new();
        TeamStore::create(&store, &Team::new("backend", vec![])).await.unwrap();
        let err = TeamStore::create(&store, &Team::new("backend", vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TeamExists);

        let pr = PullRequest::new("pr-1", "Add search", "u1", vec![]);
        PrStore::create(&store, &pr).await.unwrap();
        let err = PrStore::create(&store, &pr).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PrExists);
    }

    #[tokio::test]
    async fn test_unknown_entities() {
        let store = InMemoryStore::new();
        assert!(TeamStore::get_by_name(&store, "nope").await.unwrap().is_none());
        assert!(UserStore::get_by_id(&store, "nope").await.unwrap().is_none());
        assert!(PrStore::get_by_id(&store, "nope").await.unwrap().is_none());

        let err = UserStore::update(&store, &User::new("nope", "x", "t", true))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);

        let err = PrStore::update(&store, &PullRequest::new("nope", "x", "u1", vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_reviews_newest_first() {
        let store = InMemoryStore::new();
        let first = PullRequest::new("pr-1", "First", "u1", vec!["u2".into()]);
        let second = PullRequest::new("pr-2", "Second", "u1", vec!["u2".into(), "u3".into()]);
        let other = PullRequest::new("pr-3", "Other", "u1", vec!["u3".into()]);
        for pr in [&first, &second, &other] {
            PrStore::create(&store, pr).await.unwrap();
        }

        let reviews = PrStore::get_by_reviewer_id(&store, "u2").await.unwrap();
        let ids: Vec<&str> = reviews.iter().map(|pr| pr.id.as_str()).collect();
        assert_eq!(ids, vec!["pr-2", "pr-1"]);
    }
}
