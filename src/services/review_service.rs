//! Review orchestration.
//!
//! Each public method is one use case: it takes the lock for the entity it
//! mutates, loads what it needs from the stores, applies the lifecycle or
//! assignment rules, and writes the result back before releasing the lock.
//!
//! Lock keys:
//! - PR id for create, merge and reassign
//! - team name for team registration
//! - user id for team registration and activity changes

use std::sync::Arc;

use crate::error::AppError;
use crate::models::{PullRequest, Team, TeamMember, User, MAX_REVIEWERS};
use crate::services::assignment::ReviewerAssigner;
use crate::services::locks::KeyedLocks;
use crate::services::store::{PrStore, TeamStore, UserStore};

/// Outcome of a successful reviewer reassignment.
#[derive(Debug, Clone)]
pub struct Reassignment {
    pub pr: PullRequest,
    pub replaced_by: String,
}

/// Entry point for every team, user and pull request operation.
pub struct ReviewService {
    teams: Arc<dyn TeamStore>,
    users: Arc<dyn UserStore>,
    prs: Arc<dyn PrStore>,
    assigner: ReviewerAssigner,
    pr_locks: KeyedLocks,
    team_locks: KeyedLocks,
    user_locks: KeyedLocks,
}

impl ReviewService {
    pub fn new(
        teams: Arc<dyn TeamStore>,
        users: Arc<dyn UserStore>,
        prs: Arc<dyn PrStore>,
        assigner: ReviewerAssigner,
    ) -> Self {
        Self {
            teams,
            users,
            prs,
            assigner,
            pr_locks: KeyedLocks::new(),
            team_locks: KeyedLocks::new(),
            user_locks: KeyedLocks::new(),
        }
    }

    /// Build a service over a single store that implements all three traits.
    pub fn with_store<S>(store: Arc<S>, assigner: ReviewerAssigner) -> Self
    where
        S: TeamStore + UserStore + PrStore + 'static,
    {
        Self::new(store.clone(), store.clone(), store, assigner)
    }

    // ── Teams & users ────────────────────────────────────────────────────────

    /// Register a team and create or move its members into it.
    pub async fn create_team(
        &self,
        team_name: &str,
        members: Vec<TeamMember>,
    ) -> Result<Team, AppError> {
        require(team_name, "team_name")?;
        for member in &members {
            require(&member.user_id, "user_id")?;
        }

        let _team_guard = self.team_locks.acquire(team_name).await;
        let _user_guards = self
            .user_locks
            .acquire_many(members.iter().map(|m| m.user_id.as_str()))
            .await;

        if self.teams.exists(team_name).await? {
            return Err(AppError::team_exists(team_name));
        }

        // Not transactional: a store failure after this point leaves the team
        // row with only the members written so far.
        self.teams.create(&Team::new(team_name, Vec::new())).await?;

        let mut saved: Vec<User> = Vec::with_capacity(members.len());
        for member in members {
            let user = match self.users.get_by_id(&member.user_id).await? {
                // An existing user keeps its display name
                Some(mut existing) => {
                    existing.team_name = team_name.to_string();
                    existing.is_active = member.is_active;
                    self.users.update(&existing).await?;
                    existing
                }
                None => {
                    let user =
                        User::new(member.user_id, member.username, team_name, member.is_active);
                    self.users.create(&user).await?;
                    user
                }
            };

            // A repeated id in the request overwrites the earlier entry
            saved.retain(|u| u.user_id != user.user_id);
            saved.push(user);
        }

        log::info!(
            "[review] Created team {} with {} members",
            team_name,
            saved.len()
        );

        Ok(Team::new(team_name, saved))
    }

    /// Look up a team with its current roster.
    pub async fn get_team(&self, team_name: &str) -> Result<Team, AppError> {
        require(team_name, "team_name")?;

        self.teams
            .get_by_name(team_name)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("Team", team_name))
    }

    /// Toggle whether a user receives new review assignments.
    ///
    /// Existing assignments are left alone; they have to be reassigned
    /// explicitly.
    pub async fn set_active(&self, user_id: &str, is_active: bool) -> Result<User, AppError> {
        require(user_id, "user_id")?;

        let _guard = self.user_locks.acquire(user_id).await;

        let mut user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("User", user_id))?;

        user.set_active(is_active);
        self.users.update(&user).await?;

        log::info!("[review] User {} is_active={}", user_id, is_active);

        Ok(user)
    }

    /// Every PR, open or merged, on which the user is a current reviewer.
    pub async fn get_reviews_for_user(&self, user_id: &str) -> Result<Vec<PullRequest>, AppError> {
        require(user_id, "user_id")?;

        if self.users.get_by_id(user_id).await?.is_none() {
            return Err(AppError::not_found_with_id("User", user_id));
        }

        self.prs.get_by_reviewer_id(user_id).await
    }

    // ── Pull requests ────────────────────────────────────────────────────────

    /// Open a PR and assign up to two reviewers from the author's team.
    pub async fn create_pr(
        &self,
        pr_id: &str,
        pr_name: &str,
        author_id: &str,
    ) -> Result<PullRequest, AppError> {
        require(pr_id, "pull_request_id")?;
        require(pr_name, "pull_request_name")?;
        require(author_id, "author_id")?;

        let _guard = self.pr_locks.acquire(pr_id).await;

        if self.prs.exists(pr_id).await? {
            return Err(AppError::pr_exists(pr_id));
        }

        let author = self
            .users
            .get_by_id(author_id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("User", author_id))?;

        let team = self
            .teams
            .get_by_name(&author.team_name)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("Team", &author.team_name))?;

        let reviewers = self
            .assigner
            .assign_reviewers(&team, &author.user_id, MAX_REVIEWERS);

        let pr = PullRequest::new(pr_id, pr_name, author_id, reviewers);
        self.prs.create(&pr).await?;

        log::info!(
            "[review] Created PR {} by {} with reviewers {:?}",
            pr.id,
            pr.author_id,
            pr.assigned_reviewers
        );

        Ok(pr)
    }

    /// Merge a PR. Merging twice succeeds and keeps the first merge time.
    pub async fn merge_pr(&self, pr_id: &str) -> Result<PullRequest, AppError> {
        require(pr_id, "pull_request_id")?;

        let _guard = self.pr_locks.acquire(pr_id).await;

        let mut pr = self
            .prs
            .get_by_id(pr_id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("PullRequest", pr_id))?;

        if pr.merge() {
            self.prs.update(&pr).await?;
            log::info!("[review] Merged PR {}", pr.id);
        } else {
            log::debug!("[review] PR {} already merged", pr.id);
        }

        Ok(pr)
    }

    /// Replace one reviewer with another active member of that reviewer's team.
    pub async fn reassign_reviewer(
        &self,
        pr_id: &str,
        old_user_id: &str,
    ) -> Result<Reassignment, AppError> {
        require(pr_id, "pull_request_id")?;
        require(old_user_id, "old_user_id")?;

        let _guard = self.pr_locks.acquire(pr_id).await;

        let mut pr = self
            .prs
            .get_by_id(pr_id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("PullRequest", pr_id))?;

        if !pr.can_reassign() {
            return Err(AppError::pr_merged(pr_id));
        }

        if !pr.has_reviewer(old_user_id) {
            return Err(AppError::not_assigned(pr_id, old_user_id));
        }

        let old_reviewer = self
            .users
            .get_by_id(old_user_id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("User", old_user_id))?;

        let team = self
            .teams
            .get_by_name(&old_reviewer.team_name)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("Team", &old_reviewer.team_name))?;

        let replacement = self
            .assigner
            .find_replacement_candidate(&team, &pr.exclusion_set())?;

        pr.replace_reviewer(old_user_id, replacement.user_id.clone())?;
        self.prs.update(&pr).await?;

        log::info!(
            "[review] PR {}: reviewer {} replaced by {}",
            pr.id,
            old_user_id,
            replacement.user_id
        );

        Ok(Reassignment {
            pr,
            replaced_by: replacement.user_id,
        })
    }
}

/// Reject empty identifiers before touching any store.
fn require(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_input_field(
            format!("{} is required", field),
            field,
        ));
    }
    Ok(())
}
