// ABOUTME: Merging branches, pushing to and pulling from the shared central repository
// Concurrent edits on the same line resolve to the source branch's text

mod common;

use common::{commit_edit, Fixture};
use workflow_config::git::{
    GitProvider, MergeOrchestrator, MergeStatus, SnapshotReader, SnapshotRef, VcError,
};

#[test]
fn test_overlapping_edits_resolve_to_source_side() {
    let fixture = Fixture::seeded();
    let repo = fixture.open("alice");
    repo.create_branch("feature").unwrap();

    repo.switch_branch("feature").unwrap();
    commit_edit(&repo, "Feature rename", |doc| {
        doc.workflows[0].workflow_name = "Onboarding (feature)".to_string();
    });

    repo.switch_branch("main").unwrap();
    commit_edit(&repo, "Main rename", |doc| {
        doc.workflows[0].workflow_name = "Onboarding (main)".to_string();
    });

    let status = MergeOrchestrator::new(&repo)
        .merge_branches("feature", "main", "Merge feature into main")
        .unwrap();
    assert!(matches!(status, MergeStatus::Merged(_)));

    let merged = SnapshotReader::new(&repo).read(SnapshotRef::WorkingCopy).unwrap();
    assert_eq!(merged.workflows[0].workflow_name, "Onboarding (feature)");
    assert!(!repo.status().unwrap().is_dirty);
    assert_eq!(repo.current_branch_name().unwrap().as_deref(), Some("main"));

    let bob = fixture.open("bob");
    let published = SnapshotReader::new(&bob).read(SnapshotRef::WorkingCopy).unwrap();
    assert_eq!(published.workflows[0].workflow_name, "Onboarding (feature)");
}

#[test]
fn test_merge_into_untouched_target_fast_forwards_and_publishes() {
    let fixture = Fixture::seeded();
    let repo = fixture.open("alice");
    repo.create_branch("feature").unwrap();
    repo.switch_branch("feature").unwrap();
    commit_edit(&repo, "Describe", |doc| doc.workflows[0].description = "updated".to_string());
    let feature_tip = repo.head_commit().unwrap().unwrap();

    let status = MergeOrchestrator::new(&repo)
        .merge_branches("feature", "main", "Merge feature")
        .unwrap();
    assert_eq!(status, MergeStatus::FastForward(feature_tip));

    let central = git2::Repository::open_bare(fixture.registry.central_repo_path()).unwrap();
    let central_main = central.find_reference("refs/heads/main").unwrap().target();
    assert_eq!(central_main, Some(feature_tip));
}

#[test]
fn test_push_behind_remote_is_rejected() {
    let fixture = Fixture::seeded();
    let alice = fixture.open("alice");
    let bob = fixture.open("bob");

    commit_edit(&alice, "Alice edit", |doc| doc.workflows[0].description = "alice".to_string());
    alice.push_current().unwrap();

    commit_edit(&bob, "Bob edit", |doc| doc.workflows[0].description = "bob".to_string());
    let err = bob.push_current().unwrap_err();
    assert!(matches!(err, VcError::PushFailed(_)), "unexpected error: {err:?}");
    assert!(err.is_retryable());
}

#[test]
fn test_pull_fast_forwards_to_published_commit() {
    let fixture = Fixture::seeded();
    let alice = fixture.open("alice");
    let bob = fixture.open("bob");

    commit_edit(&alice, "Alice edit", |doc| doc.workflows[0].description = "alice".to_string());
    alice.push_current().unwrap();

    let status = bob.pull().unwrap();
    assert_eq!(status, MergeStatus::FastForward(alice.head_commit().unwrap().unwrap()));

    let document = SnapshotReader::new(&bob).read(SnapshotRef::WorkingCopy).unwrap();
    assert_eq!(document.workflows[0].description, "alice");
    assert_eq!(bob.status().unwrap().commits_behind, 0);
}

#[test]
fn test_status_counts_unpushed_commits() {
    let fixture = Fixture::seeded();
    let repo = fixture.open("alice");

    commit_edit(&repo, "One", |doc| doc.workflows[0].description = "1".to_string());
    commit_edit(&repo, "Two", |doc| doc.workflows[0].description = "2".to_string());

    let status = repo.status().unwrap();
    assert_eq!(status.current_branch, "main");
    assert_eq!(status.commits_ahead, 2);

    repo.push_current().unwrap();
    assert_eq!(repo.status().unwrap().commits_ahead, 0);
}

#[test]
fn test_second_merge_catches_up_with_published_target() {
    let fixture = Fixture::seeded();
    let alice = fixture.open("alice");
    let bob = fixture.open("bob");

    alice.create_branch("f1").unwrap();
    alice.switch_branch("f1").unwrap();
    commit_edit(&alice, "Rename setup task", |doc| {
        doc.workflows[0].phases[1].tasks[0].task_name = "Create account (alice)".to_string();
    });
    MergeOrchestrator::new(&alice)
        .merge_branches("f1", "main", "Merge f1")
        .unwrap();

    bob.create_branch("f2").unwrap();
    bob.switch_branch("f2").unwrap();
    commit_edit(&bob, "Rename workflow", |doc| {
        doc.workflows[0].workflow_name = "Onboarding (bob)".to_string();
    });
    let status = MergeOrchestrator::new(&bob)
        .merge_branches("f2", "main", "Merge f2")
        .unwrap();
    assert!(matches!(status, MergeStatus::Merged(_)), "unexpected status: {status:?}");

    let carol = fixture.open("carol");
    let published = SnapshotReader::new(&carol).read(SnapshotRef::WorkingCopy).unwrap();
    assert_eq!(published.workflows[0].workflow_name, "Onboarding (bob)");
    assert_eq!(
        published.workflows[0].phases[1].tasks[0].task_name,
        "Create account (alice)"
    );
    assert_eq!(bob.status().unwrap().commits_ahead, 0);
}

#[test]
fn test_diverged_target_is_refused_before_merging() {
    let fixture = Fixture::seeded();
    let alice = fixture.open("alice");
    let bob = fixture.open("bob");

    commit_edit(&alice, "Alice edit", |doc| doc.workflows[0].description = "alice".to_string());
    alice.push_current().unwrap();

    bob.create_branch("feature").unwrap();
    commit_edit(&bob, "Unpublished main edit", |doc| {
        doc.workflows[0].phases[1].tasks[0].task_name = "Create account (bob)".to_string();
    });
    let before = bob.head_commit().unwrap();

    let err = MergeOrchestrator::new(&bob)
        .merge_branches("feature", "main", "Merge feature")
        .unwrap_err();
    assert!(matches!(err, VcError::InvalidOperation(_)), "unexpected error: {err:?}");
    assert!(!err.is_retryable());
    assert_eq!(bob.head_commit().unwrap(), before);
}
