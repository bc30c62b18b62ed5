// ABOUTME: Git provider seam consumed by the snapshot reader, branch comparator, and merge orchestrator
// Implemented over libgit2 by GitRepository and mocked in unit tests

use super::VcResult;
use git2::Oid;

/// A branch name resolved to a concrete reference and its tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBranch {
    /// Full reference name, e.g. `refs/heads/main` or `refs/remotes/origin/main`.
    pub reference: String,
    pub commit: Oid,
}

impl ResolvedBranch {
    pub fn is_remote(&self) -> bool {
        self.reference.starts_with("refs/remotes/")
    }
}

/// Conflict policy applied by the merge machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeFavor {
    /// Leave textual conflicts for the caller to report.
    Normal,
    /// Resolve any textual conflict by taking the incoming (source) side.
    Source,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStatus {
    UpToDate,
    FastForward(Oid),
    Merged(Oid),
    Conflicts(Vec<String>),
}

#[cfg_attr(test, mockall::automock)]
pub trait GitProvider {
    /// Tries, in order: the exact branch name, `refs/heads/<name>`,
    /// `origin/<name>`, `refs/remotes/origin/<name>`.
    fn resolve_branch(&self, name: &str) -> VcResult<Option<ResolvedBranch>>;

    fn lookup_commit(&self, id: &str) -> VcResult<Option<Oid>>;

    fn head_commit(&self) -> VcResult<Option<Oid>>;

    fn read_blob_at_commit(&self, commit: Oid, path: &str) -> VcResult<Option<Vec<u8>>>;

    fn read_working_tree_file(&self, path: &str) -> VcResult<Option<Vec<u8>>>;

    /// Number of commits reachable from `from` but not from `excluding`.
    fn commits_reachable_excluding(&self, from: Oid, excluding: Oid) -> VcResult<usize>;

    /// Checks out the branch behind `reference`, returning the local branch name now on HEAD.
    fn checkout(&self, reference: &str) -> VcResult<String>;

    /// Fetches origin and fast-forwards the checked-out `branch` when it is strictly behind
    /// its upstream. Returns whether HEAD moved; a branch that diverged from upstream is an error.
    fn fast_forward_to_upstream(&self, branch: &str) -> VcResult<bool>;

    /// Merges `commit` into HEAD, committing with `message` when a merge commit is needed.
    fn merge(&self, commit: Oid, favor: MergeFavor, message: &str) -> VcResult<MergeStatus>;

    fn push(&self, remote: &str, refspec: &str) -> VcResult<()>;
}
