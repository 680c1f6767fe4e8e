//! Reviewer assignment engine.
//!
//! Picks initial reviewers for a new pull request and single replacements
//! when a reviewer is reassigned. Selection is a uniform random sample over
//! the candidate pool; the random source is injected so tests can make it
//! deterministic.

use crate::error::AppError;
use crate::models::{Team, User};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Random reviewer selection over a team snapshot.
pub struct ReviewerAssigner {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl Default for ReviewerAssigner {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewerAssigner {
    /// Assigner seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic assigner, for tests and reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    fn rng(&self) -> MutexGuard<'_, Box<dyn RngCore + Send>> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pick up to `max_reviewers` distinct active members other than the author.
    ///
    /// An empty pool yields an empty list: a PR without reviewers is valid.
    pub fn assign_reviewers(
        &self,
        team: &Team,
        author_id: &str,
        max_reviewers: usize,
    ) -> Vec<String> {
        if max_reviewers == 0 {
            return Vec::new();
        }

        let candidates = distinct(team.active_members_excluding(author_id));
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut rng = self.rng();
        candidates
            .choose_multiple(&mut *rng, max_reviewers)
            .map(|user| user.user_id.clone())
            .collect()
    }

    /// Pick one active member whose id is not in `exclude_ids`.
    ///
    /// `exclude_ids` is normally the author plus every current reviewer.
    pub fn find_replacement_candidate(
        &self,
        team: &Team,
        exclude_ids: &[String],
    ) -> Result<User, AppError> {
        let excluded: HashSet<&str> = exclude_ids.iter().map(String::as_str).collect();
        let candidates = distinct(
            team.active_members()
                .filter(|m| !excluded.contains(m.user_id.as_str())),
        );

        let mut rng = self.rng();
        candidates
            .choose(&mut *rng)
            .map(|user| (*user).clone())
            .ok_or_else(|| AppError::no_candidate(&team.team_name))
    }
}

/// Drop repeated user ids, keeping the first occurrence.
fn distinct<'a>(users: impl Iterator<Item = &'a User>) -> Vec<&'a User> {
    let mut seen = HashSet::new();
    users.filter(|u| seen.insert(u.user_id.as_str())).collect()
}
