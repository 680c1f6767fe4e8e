//! Pull request model and its lifecycle.
//!
//! A pull request starts `Open`, may have its reviewers replaced any number
//! of times while open, and moves exactly once to `Merged`, which is terminal.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of reviewers assigned to a pull request.
pub const MAX_REVIEWERS: usize = 2;

/// Status of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrStatus {
    Open,
    Merged,
}

impl From<&str> for PrStatus {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "MERGED" => Self::Merged,
            _ => Self::Open,
        }
    }
}

impl std::fmt::Display for PrStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Merged => write!(f, "MERGED"),
        }
    }
}

/// Current time at millisecond precision, the precision timestamps are stored with.
pub fn timestamp_now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// A pull request with its assigned reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Globally unique PR id.
    pub id: String,

    /// PR title.
    pub name: String,

    /// User id of the author.
    pub author_id: String,

    pub status: PrStatus,

    /// Reviewer user ids in assignment order. Never contains the author
    /// or duplicates.
    pub assigned_reviewers: Vec<String>,

    pub created_at: DateTime<Utc>,

    /// Set once, when the PR is merged.
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Create a new open pull request.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        author_id: impl Into<String>,
        reviewers: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            author_id: author_id.into(),
            status: PrStatus::Open,
            assigned_reviewers: reviewers,
            created_at: timestamp_now(),
            merged_at: None,
        }
    }

    /// Mark the PR as merged.
    ///
    /// Merging an already merged PR is a successful no-op that keeps the
    /// original `merged_at`. Returns `true` if this call performed the
    /// transition.
    pub fn merge(&mut self) -> bool {
        if self.is_merged() {
            return false;
        }

        self.status = PrStatus::Merged;
        self.merged_at = Some(timestamp_now());
        true
    }

    /// Reviewers can only change while the PR is open.
    pub fn can_reassign(&self) -> bool {
        self.status == PrStatus::Open
    }

    pub fn is_merged(&self) -> bool {
        self.status == PrStatus::Merged
    }

    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.assigned_reviewers.iter().any(|r| r == user_id)
    }

    /// Ids that may not be picked as a new reviewer: the author and
    /// everyone already reviewing.
    pub fn exclusion_set(&self) -> Vec<String> {
        std::iter::once(self.author_id.clone())
            .chain(self.assigned_reviewers.iter().cloned())
            .collect()
    }

    /// Replace `old_user_id` with `new_user_id` at the same position.
    pub fn replace_reviewer(
        &mut self,
        old_user_id: &str,
        new_user_id: impl Into<String>,
    ) -> Result<(), AppError> {
        if !self.can_reassign() {
            return Err(AppError::pr_merged(&self.id));
        }

        let slot = self
            .assigned_reviewers
            .iter_mut()
            .find(|r| r.as_str() == old_user_id)
            .ok_or_else(|| AppError::not_assigned(&self.id, old_user_id))?;

        *slot = new_user_id.into();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn open_pr() -> PullRequest {
        PullRequest::new("pr-1", "Add search", "u1", vec!["u2".into(), "u3".into()])
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(PrStatus::from("OPEN"), PrStatus::Open);
        assert_eq!(PrStatus::from("merged"), PrStatus::Merged);
        assert_eq!(PrStatus::from("unknown"), PrStatus::Open);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(PrStatus::Open.to_string(), "OPEN");
        assert_eq!(PrStatus::Merged.to_string(), "MERGED");
    }

    #[test]
    fn test_new_pr_is_open() {
        let pr = open_pr();
        assert_eq!(pr.status, PrStatus::Open);
        assert!(pr.merged_at.is_none());
        assert!(pr.can_reassign());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut pr = open_pr();
        assert!(pr.merge());
        let merged_at = pr.merged_at;
        assert!(merged_at.is_some());

        assert!(!pr.merge());
        assert_eq!(pr.status, PrStatus::Merged);
        assert_eq!(pr.merged_at, merged_at);
        assert_eq!(pr.assigned_reviewers, vec!["u2", "u3"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut pr = open_pr();
        pr.replace_reviewer("u2", "u4").unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["u4", "u3"]);

        pr.replace_reviewer("u3", "u5").unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["u4", "u5"]);
    }

    #[test]
    fn test_replace_on_merged_fails() {
        let mut pr = open_pr();
        pr.merge();

        let err = pr.replace_reviewer("u2", "u4").unwrap_err();
        assert_eq!(err.code(), ErrorCode::PrMerged);
        assert_eq!(pr.assigned_reviewers, vec!["u2", "u3"]);
    }

    #[test]
    fn test_replace_unassigned_fails() {
        let mut pr = open_pr();
        let err = pr.replace_reviewer("u9", "u4").unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotAssigned);
        assert_eq!(pr.assigned_reviewers, vec!["u2", "u3"]);
    }

    #[test]
    fn test_merged_check_precedes_assignment_check() {
        let mut pr = open_pr();
        pr.merge();
        let err = pr.replace_reviewer("u9", "u4").unwrap_err();
        assert_eq!(err.code(), ErrorCode::PrMerged);
    }

    #[test]
    fn test_exclusion_set() {
        let pr = open_pr();
        assert_eq!(pr.exclusion_set(), vec!["u1", "u2", "u3"]);
    }

    #[test]
    fn test_timestamp_precision_is_millis() {
        let ts = timestamp_now();
        assert_eq!(ts.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
