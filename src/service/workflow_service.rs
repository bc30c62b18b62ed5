// ABOUTME: Async facade over the per-user repositories and the shared pull request store
// Each call holds the user's lock and runs its Git work on the blocking pool with a fresh handle

use super::user_locks::UserLocks;
use crate::config::AppConfig;
use crate::git::{
    diff_against_last_commit, Author, BranchComparator, Endpoint, GitRepository, MergeOrchestrator,
    MergeStatus, RepositoryRegistry, SnapshotReader, SnapshotRef, VcError, VcResult,
};
use crate::models::{
    BranchComparison, ChangeCounts, ChangeStatus, CommitInfo, CreatePullRequest, GitStatus, ProgramWorkflows,
    PullRequest, Workflow,
};
use crate::pull_requests::{PullRequestService, PullRequestStore};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct WorkflowService {
    registry: Arc<RepositoryRegistry>,
    pull_requests: Arc<PullRequestStore>,
    locks: UserLocks,
}

impl WorkflowService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            registry: Arc::new(RepositoryRegistry::new(config)),
            pull_requests: Arc::new(PullRequestStore::new(&config.pull_requests_path)),
            locks: UserLocks::new(),
        }
    }

    pub fn registry(&self) -> &RepositoryRegistry {
        &self.registry
    }

    async fn with_repo<T, F>(&self, user: &str, op: F) -> VcResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&GitRepository, &PullRequestStore) -> VcResult<T> + Send + 'static,
    {
        let _guard = self.locks.acquire(user).await;
        debug!("Acquired repository lock for {}", user);

        let registry = Arc::clone(&self.registry);
        let store = Arc::clone(&self.pull_requests);
        let user = user.to_string();
        tokio::task::spawn_blocking(move || {
            let repo = registry.open(&user)?;
            op(&repo, &store)
        })
        .await?
    }

    async fn blocking<T, F>(&self, op: F) -> VcResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&RepositoryRegistry, &PullRequestStore) -> VcResult<T> + Send + 'static,
    {
        let registry = Arc::clone(&self.registry);
        let store = Arc::clone(&self.pull_requests);
        tokio::task::spawn_blocking(move || op(&registry, &store)).await?
    }

    /// Creates the central repository and seeds it with `document` if it is still empty.
    pub async fn initialize(&self, document: ProgramWorkflows) -> VcResult<bool> {
        self.blocking(move |registry, _| {
            registry.init_central()?;
            registry.seed_central(&document)
        })
        .await
    }

    // Workflow documents

    /// Working copy annotated with changes since the last commit.
    pub async fn read_workflows(&self, user: &str) -> VcResult<ProgramWorkflows> {
        self.with_repo(user, |repo, _| diff_against_last_commit(repo)).await
    }

    pub async fn change_summary(&self, user: &str) -> VcResult<ChangeCounts> {
        Ok(self.read_workflows(user).await?.change_summary())
    }

    pub async fn get_workflow(&self, user: &str, key: &str) -> VcResult<Workflow> {
        let key = key.to_string();
        self.with_repo(user, move |repo, _| {
            diff_against_last_commit(repo)?
                .workflows
                .into_iter()
                .find(|workflow| workflow.workflow_key == key)
                .ok_or(VcError::WorkflowNotFound(key))
        })
        .await
    }

    pub async fn create_workflow(&self, user: &str, workflow: Workflow) -> VcResult<Workflow> {
        self.with_repo(user, move |repo, _| {
            let mut document = SnapshotReader::new(repo).read(SnapshotRef::WorkingCopy)?;
            if document.find(&workflow.workflow_key).is_some() {
                return Err(VcError::WorkflowExists(workflow.workflow_key));
            }

            let key = workflow.workflow_key.clone();
            document.workflows.push(workflow);
            stored_workflow(repo, &mut document, &key)
        })
        .await
    }

    /// Replaces the workflow stored under `key`; the body's own key is overridden.
    pub async fn update_workflow(&self, user: &str, key: &str, mut workflow: Workflow) -> VcResult<Workflow> {
        let key = key.to_string();
        self.with_repo(user, move |repo, _| {
            let mut document = SnapshotReader::new(repo).read(SnapshotRef::WorkingCopy)?;
            let index = document
                .position(&key)
                .ok_or_else(|| VcError::WorkflowNotFound(key.clone()))?;

            workflow.workflow_key = key.clone();
            workflow.change_status = ChangeStatus::None;
            document.workflows[index] = workflow;
            stored_workflow(repo, &mut document, &key)
        })
        .await
    }

    pub async fn delete_workflow(&self, user: &str, key: &str) -> VcResult<()> {
        let key = key.to_string();
        self.with_repo(user, move |repo, _| {
            let mut document = SnapshotReader::new(repo).read(SnapshotRef::WorkingCopy)?;
            let index = document
                .position(&key)
                .ok_or_else(|| VcError::WorkflowNotFound(key.clone()))?;

            document.workflows.remove(index);
            repo.write_workflows(&document)?;
            info!("Deleted workflow {}", key);
            Ok(())
        })
        .await
    }

    // Working copy

    pub async fn status(&self, user: &str) -> VcResult<GitStatus> {
        self.with_repo(user, |repo, _| repo.status()).await
    }

    pub async fn commit(&self, user: &str, message: &str, author: Author) -> VcResult<String> {
        let message = message.to_string();
        self.with_repo(user, move |repo, _| {
            Ok(repo.commit_all(&message, &author)?.to_string())
        })
        .await
    }

    pub async fn discard_changes(&self, user: &str) -> VcResult<()> {
        self.with_repo(user, |repo, _| repo.discard_changes()).await
    }

    pub async fn pull(&self, user: &str) -> VcResult<MergeStatus> {
        self.with_repo(user, |repo, _| repo.pull()).await
    }

    pub async fn push(&self, user: &str) -> VcResult<()> {
        self.with_repo(user, |repo, _| repo.push_current()).await
    }

    pub async fn create_branch(&self, user: &str, name: &str) -> VcResult<()> {
        let name = name.to_string();
        self.with_repo(user, move |repo, _| repo.create_branch(&name)).await
    }

    pub async fn switch_branch(&self, user: &str, name: &str) -> VcResult<String> {
        let name = name.to_string();
        self.with_repo(user, move |repo, _| repo.switch_branch(&name)).await
    }

    pub async fn branches(&self, user: &str) -> VcResult<Vec<String>> {
        self.with_repo(user, |repo, _| repo.branches()).await
    }

    pub async fn commit_history(&self, user: &str, count: usize) -> VcResult<Vec<CommitInfo>> {
        self.with_repo(user, move |repo, _| repo.commit_history(count)).await
    }

    // Branch comparison and merging

    pub async fn resolve_commit_id_for_branch(&self, user: &str, branch: &str) -> VcResult<String> {
        let branch = branch.to_string();
        self.with_repo(user, move |repo, _| {
            BranchComparator::new(repo).resolve_commit_id_for_branch(&branch)
        })
        .await
    }

    pub async fn compare_branches(
        &self,
        user: &str,
        source_branch: &str,
        target_branch: &str,
        source_commit: Option<String>,
        target_commit: Option<String>,
    ) -> VcResult<BranchComparison> {
        let source_branch = source_branch.to_string();
        let target_branch = target_branch.to_string();
        self.with_repo(user, move |repo, _| {
            BranchComparator::new(repo).compare(
                Endpoint::pinned(&source_branch, source_commit.as_deref()),
                Endpoint::pinned(&target_branch, target_commit.as_deref()),
            )
        })
        .await
    }

    pub async fn merge_branches(
        &self,
        user: &str,
        source_branch: &str,
        target_branch: &str,
        message: &str,
    ) -> VcResult<MergeStatus> {
        let source_branch = source_branch.to_string();
        let target_branch = target_branch.to_string();
        let message = message.to_string();
        self.with_repo(user, move |repo, _| {
            MergeOrchestrator::new(repo).merge_branches(&source_branch, &target_branch, &message)
        })
        .await
    }

    // Pull requests

    pub async fn list_pull_requests(&self, status: Option<String>) -> VcResult<Vec<PullRequest>> {
        self.blocking(move |_, store| PullRequestService::new(store).list(status.as_deref()))
            .await
    }

    pub async fn get_pull_request(&self, number: u32) -> VcResult<PullRequest> {
        self.blocking(move |_, store| PullRequestService::new(store).get(number))
            .await
    }

    pub async fn create_pull_request(&self, user: &str, request: CreatePullRequest) -> VcResult<PullRequest> {
        let author = user.to_string();
        self.with_repo(user, move |repo, store| {
            repo.fetch_origin()?;
            PullRequestService::new(store).create(repo, &author, request)
        })
        .await
    }

    pub async fn pull_request_comparison(&self, user: &str, number: u32) -> VcResult<BranchComparison> {
        self.with_repo(user, move |repo, store| {
            repo.fetch_origin()?;
            PullRequestService::new(store).comparison(repo, number)
        })
        .await
    }

    pub async fn merge_pull_request(&self, user: &str, number: u32) -> VcResult<PullRequest> {
        self.with_repo(user, move |repo, store| {
            repo.fetch_origin()?;
            PullRequestService::new(store).merge(repo, number)
        })
        .await
    }

    pub async fn close_pull_request(&self, number: u32) -> VcResult<PullRequest> {
        self.blocking(move |_, store| PullRequestService::new(store).close(number))
            .await
    }
}

fn stored_workflow(repo: &GitRepository, document: &mut ProgramWorkflows, key: &str) -> VcResult<Workflow> {
    document.drop_deleted();
    document.clear_change_status();
    crate::diff::ensure_ids(document);
    repo.write_workflows(document)?;
    info!("Saved workflow {}", key);
    document
        .find(key)
        .cloned()
        .ok_or_else(|| VcError::WorkflowNotFound(key.to_string()))
}
