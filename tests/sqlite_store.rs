//! SQLite store behaviour.

use chrono::Duration;
use pr_reviewer_lib::db;
use pr_reviewer_lib::error::ErrorCode;
use pr_reviewer_lib::models::{PrStatus, PullRequest, Team, User};
use pr_reviewer_lib::services::{PrStore, SqliteStore, TeamStore, UserStore};
use tempfile::{tempdir, TempDir};

async fn setup() -> (SqliteStore, TempDir) {
    let dir = tempdir().unwrap();
    let pool = db::initialize(&dir.path().join("store.db"), 5).await.unwrap();
    let store = SqliteStore::new(pool);

    TeamStore::create(&store, &Team::new("backend", vec![])).await.unwrap();
    for (id, name) in [("u3", "Carol"), ("u1", "Alice"), ("u2", "Bob")] {
        UserStore::create(&store, &User::new(id, name, "backend", true))
            .await
            .unwrap();
    }

    (store, dir)
}

#[tokio::test]
async fn test_team_roster_is_ordered_and_derived() {
    let (store, _dir) = setup().await;

    let team = TeamStore::get_by_name(&store, "backend").await.unwrap().unwrap();
    let ids: Vec<&str> = team.members.iter().map(|u| u.user_id.as_str()).collect();
    assert_eq!(ids, vec!["u1", "u2", "u3"]);

    TeamStore::create(&store, &Team::new("frontend", vec![])).await.unwrap();
    let mut moved = UserStore::get_by_id(&store, "u2").await.unwrap().unwrap();
    moved.team_name = "frontend".into();
    moved.set_active(false);
    UserStore::update(&store, &moved).await.unwrap();

    let backend = TeamStore::get_by_name(&store, "backend").await.unwrap().unwrap();
    assert_eq!(backend.members.len(), 2);
    let frontend = UserStore::get_by_team_name(&store, "frontend").await.unwrap();
    assert_eq!(frontend, vec![moved]);

    assert!(TeamStore::get_by_name(&store, "nope").await.unwrap().is_none());
    assert!(TeamStore::exists(&store, "frontend").await.unwrap());
    assert!(UserStore::exists(&store, "u1").await.unwrap());
    assert!(!UserStore::exists(&store, "ghost").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_keys_map_to_conflicts() {
    let (store, _dir) = setup().await;

    let err = TeamStore::create(&store, &Team::new("backend", vec![]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::TeamExists);

    let pr = PullRequest::new("pr-1", "Add search", "u1", vec!["u2".into()]);
    PrStore::create(&store, &pr).await.unwrap();
    let err = PrStore::create(&store, &pr).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::PrExists);
}

#[tokio::test]
async fn test_user_in_unknown_team_is_rejected() {
    let (store, _dir) = setup().await;

    let err = UserStore::create(&store, &User::new("x1", "Xena", "ghost-team", true))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn test_pull_request_roundtrip() {
    let (store, _dir) = setup().await;

    let mut pr = PullRequest::new("pr-1", "Add search", "u1", vec!["u3".into(), "u2".into()]);
    PrStore::create(&store, &pr).await.unwrap();

    let loaded = PrStore::get_by_id(&store, "pr-1").await.unwrap().unwrap();
    assert_eq!(loaded, pr);

    pr.merge();
    PrStore::update(&store, &pr).await.unwrap();

    let loaded = PrStore::get_by_id(&store, "pr-1").await.unwrap().unwrap();
    assert_eq!(loaded.status, PrStatus::Merged);
    assert_eq!(loaded.merged_at, pr.merged_at);
    assert_eq!(loaded.assigned_reviewers, vec!["u3", "u2"]);
}

#[tokio::test]
async fn test_update_keeps_reviewer_order() {
    let (store, _dir) = setup().await;
    UserStore::create(&store, &User::new("u4", "Dave", "backend", true))
        .await
        .unwrap();

    let mut pr = PullRequest::new("pr-1", "Add search", "u3", vec!["u1".into(), "u2".into()]);
    PrStore::create(&store, &pr).await.unwrap();

    // Replacing the first slot must not move it to the end
    pr.replace_reviewer("u1", "u4").unwrap();
    PrStore::update(&store, &pr).await.unwrap();

    let loaded = PrStore::get_by_id(&store, "pr-1").await.unwrap().unwrap();
    assert_eq!(loaded.assigned_reviewers, vec!["u4", "u2"]);

    let err = PrStore::update(&store, &PullRequest::new("nope", "x", "u1", vec![]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn test_reviews_newest_first() {
    let (store, _dir) = setup().await;

    let mut older = PullRequest::new("pr-old", "Older", "u1", vec!["u2".into()]);
    older.created_at = older.created_at - Duration::minutes(5);
    let same_a = PullRequest::new("pr-a", "Same A", "u1", vec!["u2".into(), "u3".into()]);
    let mut same_b = PullRequest::new("pr-b", "Same B", "u1", vec!["u2".into()]);
    same_b.created_at = same_a.created_at;
    let unrelated = PullRequest::new("pr-x", "Other", "u1", vec!["u3".into()]);

    for pr in [&older, &same_a, &same_b, &unrelated] {
        PrStore::create(&store, pr).await.unwrap();
    }

    let reviews = PrStore::get_by_reviewer_id(&store, "u2").await.unwrap();
    let ids: Vec<&str> = reviews.iter().map(|pr| pr.id.as_str()).collect();
    assert_eq!(ids, vec!["pr-b", "pr-a", "pr-old"]);
    assert_eq!(reviews[1].assigned_reviewers, vec!["u2", "u3"]);

    assert!(PrStore::get_by_reviewer_id(&store, "ghost").await.unwrap().is_empty());
    assert!(PrStore::exists(&store, "pr-a").await.unwrap());
    assert!(!PrStore::exists(&store, "pr-z").await.unwrap());
}
