// ABOUTME: Pull request workflow on top of the store: open, compare, merge, close
// Opening freezes both branch tips so merged requests keep a stable comparison

use super::store::PullRequestStore;
use crate::git::{BranchComparator, Endpoint, GitProvider, MergeOrchestrator, VcError, VcResult};
use crate::models::{BranchComparison, CreatePullRequest, PullRequest};
use tracing::info;

pub struct PullRequestService<'a> {
    store: &'a PullRequestStore,
}

impl<'a> PullRequestService<'a> {
    pub fn new(store: &'a PullRequestStore) -> Self {
        Self { store }
    }

    pub fn list(&self, status: Option<&str>) -> VcResult<Vec<PullRequest>> {
        self.store.list(status)
    }

    pub fn get(&self, number: u32) -> VcResult<PullRequest> {
        self.store.get(number)
    }

    pub fn create<P: GitProvider + ?Sized>(
        &self,
        provider: &P,
        author: &str,
        request: CreatePullRequest,
    ) -> VcResult<PullRequest> {
        if request.title.trim().is_empty() {
            return Err(VcError::InvalidOperation("Pull request title is required".to_string()));
        }
        if request.source_branch == request.target_branch {
            return Err(VcError::InvalidOperation(
                "Source and target branch must differ".to_string(),
            ));
        }

        let comparator = BranchComparator::new(provider);
        let source_sha = comparator.resolve_commit_id_for_branch(&request.source_branch)?;
        let target_sha = comparator.resolve_commit_id_for_branch(&request.target_branch)?;

        self.store.create(author, request, source_sha, target_sha)
    }

    /// Live tips for open and closed requests, frozen commits once merged.
    pub fn comparison<P: GitProvider + ?Sized>(&self, provider: &P, number: u32) -> VcResult<BranchComparison> {
        let pull_request = self.store.get(number)?;
        let (source_sha, target_sha) = pull_request.comparison_commits();

        BranchComparator::new(provider).compare(
            Endpoint::pinned(&pull_request.source_branch, source_sha),
            Endpoint::pinned(&pull_request.target_branch, target_sha),
        )
    }

    pub fn merge<P: GitProvider + ?Sized>(&self, provider: &P, number: u32) -> VcResult<PullRequest> {
        let pull_request = self.store.get(number)?;
        if !pull_request.status.is_open() {
            return Err(VcError::PullRequestNotOpen(number));
        }

        MergeOrchestrator::new(provider).merge_branches(
            &pull_request.source_branch,
            &pull_request.target_branch,
            &pull_request.title,
        )?;

        let merged = self.store.mark_merged(number)?;
        info!("Merged pull request #{}: {}", number, merged.title);
        Ok(merged)
    }

    pub fn close(&self, number: u32) -> VcResult<PullRequest> {
        self.store.close(number)
    }
}
