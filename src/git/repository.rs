// ABOUTME: libgit2-backed handle on one user's working copy
// Provides status/commit/branch/pull/push plus the GitProvider plumbing used by diff and merge

use super::provider::{GitProvider, MergeFavor, MergeStatus, ResolvedBranch};
use super::{VcError, VcResult};
use crate::codec::{encode_document, WORKFLOW_FILE_NAME};
use crate::models::{CommitInfo, GitStatus, ProgramWorkflows};
use chrono::{DateTime, Utc};
use git2::build::CheckoutBuilder;
use git2::{
    BranchType, ErrorCode, FileFavor, IndexAddOption, MergeOptions, Oid, PushOptions, Reference,
    RemoteCallbacks, Repository, ResetType, Signature, Sort, Status, StatusOptions,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const REMOTE_NAME: &str = "origin";

/// Name and email stamped on commits the system creates itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: name.into(), email: email.into() }
    }

    fn signature(&self) -> VcResult<Signature<'static>> {
        Ok(Signature::now(&self.name, &self.email)?)
    }
}

impl Default for Author {
    fn default() -> Self {
        Self::new("System", "system@workflow.com")
    }
}

pub struct GitRepository {
    repo: Repository,
    author: Author,
}

impl GitRepository {
    pub fn new(repo: Repository, author: Author) -> Self {
        Self { repo, author }
    }

    pub fn open(path: &Path, author: Author) -> VcResult<Self> {
        Ok(Self::new(Repository::open(path)?, author))
    }

    pub fn inner(&self) -> &Repository {
        &self.repo
    }

    pub fn workdir(&self) -> VcResult<&Path> {
        self.repo
            .workdir()
            .ok_or_else(|| VcError::InvalidOperation("repository has no working directory".to_string()))
    }

    pub fn document_path(&self) -> VcResult<PathBuf> {
        Ok(self.workdir()?.join(WORKFLOW_FILE_NAME))
    }

    /// Writes the document to the working copy. Committing is left to the caller.
    pub fn write_workflows(&self, document: &ProgramWorkflows) -> VcResult<()> {
        let path = self.document_path()?;
        fs::write(&path, encode_document(document)?)?;
        debug!("Wrote workflow document to {}", path.display());
        Ok(())
    }

    pub fn current_branch_name(&self) -> VcResult<Option<String>> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().map(str::to_string)),
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = self.repo.find_reference("HEAD")?;
                Ok(head
                    .symbolic_target()
                    .and_then(|target| target.strip_prefix("refs/heads/"))
                    .map(str::to_string))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn status(&self) -> VcResult<GitStatus> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let mut status = GitStatus::default();
        for entry in self.repo.statuses(Some(&mut opts))?.iter() {
            let Some(path) = entry.path() else { continue };
            let path = path.to_string();
            let flags = entry.status();

            if flags.contains(Status::WT_NEW) {
                status.untracked.push(path);
            } else if flags.contains(Status::INDEX_NEW) {
                status.added.push(path);
            } else if flags.intersects(Status::INDEX_DELETED | Status::WT_DELETED) {
                status.removed.push(path);
            } else if flags.intersects(
                Status::INDEX_MODIFIED
                    | Status::WT_MODIFIED
                    | Status::INDEX_RENAMED
                    | Status::WT_RENAMED
                    | Status::INDEX_TYPECHANGE
                    | Status::WT_TYPECHANGE,
            ) {
                status.modified.push(path);
            }
        }

        let dirty = status.changed_paths().next().is_some();
        status.is_dirty = dirty;
        status.current_branch = self
            .current_branch_name()?
            .unwrap_or_else(|| "(no branch)".to_string());
        let (ahead, behind) = self.upstream_ahead_behind()?;
        status.commits_ahead = ahead;
        status.commits_behind = behind;

        Ok(status)
    }

    fn upstream_ahead_behind(&self) -> VcResult<(usize, usize)> {
        let Some(name) = self.current_branch_name()? else {
            return Ok((0, 0));
        };
        let Ok(branch) = self.repo.find_branch(&name, BranchType::Local) else {
            return Ok((0, 0));
        };
        let Ok(upstream) = branch.upstream() else {
            return Ok((0, 0));
        };
        match (branch.get().target(), upstream.get().target()) {
            (Some(local), Some(remote)) => Ok(self.repo.graph_ahead_behind(local, remote)?),
            _ => Ok((0, 0)),
        }
    }

    /// Stages every change (including deletions) and commits it on HEAD.
    pub fn commit_all(&self, message: &str, author: &Author) -> VcResult<Oid> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let parent_commit = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        if parent_commit.as_ref().is_some_and(|parent| parent.tree_id() == tree_id) {
            return Err(VcError::InvalidOperation("No changes; nothing to commit".to_string()));
        }

        let tree = self.repo.find_tree(tree_id)?;
        let signature = author.signature()?;
        let parents: Vec<&git2::Commit> = parent_commit.iter().collect();
        let commit_id = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        info!("Created commit {} by {}", commit_id, author.name);
        Ok(commit_id)
    }

    /// Hard reset to HEAD and removal of untracked files.
    pub fn discard_changes(&self) -> VcResult<()> {
        if let Some(head) = self.head_commit()? {
            let commit = self.repo.find_commit(head)?;
            let mut checkout = CheckoutBuilder::new();
            checkout.force();
            self.repo
                .reset(commit.as_object(), ResetType::Hard, Some(&mut checkout))?;
        }

        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        let untracked: Vec<String> = self
            .repo
            .statuses(Some(&mut opts))?
            .iter()
            .filter(|entry| entry.status().contains(Status::WT_NEW))
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect();

        let workdir = self.workdir()?;
        for path in untracked {
            fs::remove_file(workdir.join(&path))?;
            debug!("Removed untracked file {}", path);
        }
        Ok(())
    }

    pub fn fetch_origin(&self) -> VcResult<()> {
        let Ok(mut remote) = self.repo.find_remote(REMOTE_NAME) else {
            warn!("Remote '{}' not configured, skipping fetch", REMOTE_NAME);
            return Ok(());
        };
        let refspecs: [&str; 0] = [];
        remote.fetch(&refspecs, None, None)?;
        debug!("Fetched from {}", REMOTE_NAME);
        Ok(())
    }

    /// Fetches and merges the upstream of the current branch.
    pub fn pull(&self) -> VcResult<MergeStatus> {
        self.fetch_origin()?;
        let branch_name = self
            .current_branch_name()?
            .ok_or_else(|| VcError::InvalidOperation("Not currently on a branch".to_string()))?;

        let Some(upstream_tip) = self.upstream_tip(&branch_name)? else {
            return Err(VcError::InvalidOperation(format!(
                "Branch '{branch_name}' has no upstream on {REMOTE_NAME}"
            )));
        };

        let message = format!("Merge remote-tracking branch '{REMOTE_NAME}/{branch_name}'");
        match self.merge(upstream_tip, MergeFavor::Normal, &message)? {
            MergeStatus::Conflicts(paths) => Err(VcError::MergeConflict(paths)),
            status => {
                info!("Pulled {} into {}: {:?}", REMOTE_NAME, branch_name, status);
                Ok(status)
            }
        }
    }

    /// Pushes the current branch and sets up tracking when it is new.
    pub fn push_current(&self) -> VcResult<()> {
        let branch_name = self
            .current_branch_name()?
            .ok_or_else(|| VcError::InvalidOperation("Not currently on a branch".to_string()))?;

        let refspec = format!("refs/heads/{branch_name}:refs/heads/{branch_name}");
        self.push(REMOTE_NAME, &refspec)?;

        let mut local = self.repo.find_branch(&branch_name, BranchType::Local)?;
        if local.upstream().is_err() {
            if let Err(e) = local.set_upstream(Some(&format!("{REMOTE_NAME}/{branch_name}"))) {
                warn!("Could not set upstream for {}: {}", branch_name, e);
            }
        }
        Ok(())
    }

    pub fn create_branch(&self, name: &str) -> VcResult<()> {
        validate_branch_name(name)?;
        let head = self
            .head_commit()?
            .ok_or_else(|| VcError::InvalidOperation("Cannot branch from an empty repository".to_string()))?;
        let commit = self.repo.find_commit(head)?;
        self.repo.branch(name, &commit, false)?;
        info!("Created new branch: {} at {}", name, head);
        Ok(())
    }

    /// Fetches, then checks out `name`. `origin/<x>` gets a local tracking branch `<x>`.
    pub fn switch_branch(&self, name: &str) -> VcResult<String> {
        self.fetch_origin()?;

        if let Some(local_name) = name.strip_prefix(&format!("{REMOTE_NAME}/")) {
            let remote_branch = self
                .repo
                .find_branch(name, BranchType::Remote)
                .map_err(|_| VcError::InvalidReference(format!("remote branch '{name}' not found")))?;
            let tip = remote_branch.get().peel_to_commit()?;

            let mut local = match self.repo.find_branch(local_name, BranchType::Local) {
                Ok(branch) => branch,
                Err(_) => self.repo.branch(local_name, &tip, false)?,
            };
            local.set_upstream(Some(name))?;
            return self.checkout(&format!("refs/heads/{local_name}"));
        }

        if self.repo.find_branch(name, BranchType::Local).is_err() {
            return Err(VcError::InvalidReference(format!("branch '{name}' not found")));
        }
        self.checkout(&format!("refs/heads/{name}"))
    }

    /// Local and remote-tracking branch names.
    pub fn branches(&self) -> VcResult<Vec<String>> {
        let mut names = Vec::new();
        for branch in self.repo.branches(None)? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                if !name.ends_with("/HEAD") {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    pub fn commit_history(&self, count: usize) -> VcResult<Vec<CommitInfo>> {
        if self.head_commit()?.is_none() {
            return Ok(Vec::new());
        }

        let mut walk = self.repo.revwalk()?;
        walk.push_head()?;
        walk.set_sorting(Sort::TIME)?;

        let mut history = Vec::new();
        for oid in walk.take(count) {
            let commit = self.repo.find_commit(oid?)?;
            history.push(CommitInfo {
                sha: commit.id().to_string(),
                message: commit.summary().unwrap_or_default().to_string(),
                author: commit.author().name().unwrap_or_default().to_string(),
                date: DateTime::<Utc>::from_timestamp(commit.time().seconds(), 0).unwrap_or_default(),
            });
        }
        Ok(history)
    }

    fn find_branch_reference(&self, candidate: &str) -> Option<Reference<'_>> {
        if candidate.starts_with("refs/") {
            return self.repo.find_reference(candidate).ok();
        }
        self.repo
            .find_branch(candidate, BranchType::Local)
            .or_else(|_| self.repo.find_branch(candidate, BranchType::Remote))
            .ok()
            .map(git2::Branch::into_reference)
    }

    /// Tip of the branch's configured upstream, falling back to `origin/<branch>`.
    fn upstream_tip(&self, branch_name: &str) -> VcResult<Option<Oid>> {
        let local = self.repo.find_branch(branch_name, BranchType::Local)?;
        let tip = match local.upstream() {
            Ok(upstream) => upstream.get().target(),
            Err(_) => self
                .repo
                .find_branch(&format!("{REMOTE_NAME}/{branch_name}"), BranchType::Remote)
                .ok()
                .and_then(|remote| remote.get().target()),
        };
        Ok(tip)
    }

    fn abort_merge(&self) -> VcResult<()> {
        self.repo.cleanup_state()?;
        let head = self.repo.head()?.peel_to_commit()?;
        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        self.repo
            .reset(head.as_object(), ResetType::Hard, Some(&mut checkout))?;
        Ok(())
    }
}

impl GitProvider for GitRepository {
    fn resolve_branch(&self, name: &str) -> VcResult<Option<ResolvedBranch>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let candidates = [
            name.to_string(),
            format!("refs/heads/{name}"),
            format!("{REMOTE_NAME}/{name}"),
            format!("refs/remotes/{REMOTE_NAME}/{name}"),
        ];
        for candidate in &candidates {
            if let Some(reference) = self.find_branch_reference(candidate) {
                let commit = reference.peel_to_commit()?.id();
                let reference = reference.name().unwrap_or(candidate.as_str()).to_string();
                debug!("Resolved branch '{}' via '{}' to {}", name, reference, commit);
                return Ok(Some(ResolvedBranch { reference, commit }));
            }
        }
        Ok(None)
    }

    fn lookup_commit(&self, id: &str) -> VcResult<Option<Oid>> {
        let id = id.trim();
        if id.len() < 4 || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(None);
        }

        let found = if id.len() == 40 {
            Oid::from_str(id).and_then(|oid| self.repo.find_commit(oid))
        } else {
            self.repo
                .revparse_single(id)
                .and_then(|object| object.peel_to_commit())
        };
        match found {
            Ok(commit) => Ok(Some(commit.id())),
            Err(e) => {
                debug!("Commit lookup for '{}' failed: {}", id, e);
                Ok(None)
            }
        }
    }

    fn head_commit(&self) -> VcResult<Option<Oid>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?.id())),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_blob_at_commit(&self, commit: Oid, path: &str) -> VcResult<Option<Vec<u8>>> {
        let tree = self.repo.find_commit(commit)?.tree()?;
        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let object = entry.to_object(&self.repo)?;
        Ok(object.as_blob().map(|blob| blob.content().to_vec()))
    }

    fn read_working_tree_file(&self, path: &str) -> VcResult<Option<Vec<u8>>> {
        match fs::read(self.workdir()?.join(path)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn commits_reachable_excluding(&self, from: Oid, excluding: Oid) -> VcResult<usize> {
        let (ahead, _behind) = self.repo.graph_ahead_behind(from, excluding)?;
        Ok(ahead)
    }

    fn checkout(&self, reference: &str) -> VcResult<String> {
        let local_name = if let Some(short) = reference.strip_prefix("refs/remotes/") {
            let local_name = short.split_once('/').map_or(short, |(_, rest)| rest).to_string();
            if self.repo.find_branch(&local_name, BranchType::Local).is_err() {
                let tip = self.repo.find_reference(reference)?.peel_to_commit()?;
                let mut branch = self.repo.branch(&local_name, &tip, false)?;
                branch.set_upstream(Some(short))?;
            }
            local_name
        } else if let Some(name) = reference.strip_prefix("refs/heads/") {
            name.to_string()
        } else {
            return Err(VcError::InvalidReference(format!("'{reference}' is not a branch")));
        };

        let full_name = format!("refs/heads/{local_name}");
        let commit = self.repo.find_reference(&full_name)?.peel_to_commit()?;
        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        self.repo.checkout_tree(commit.as_object(), Some(&mut checkout))?;
        self.repo.set_head(&full_name)?;

        info!("Checked out {}", local_name);
        Ok(local_name)
    }

    fn fast_forward_to_upstream(&self, branch: &str) -> VcResult<bool> {
        self.fetch_origin()?;
        let Some(upstream) = self.upstream_tip(branch)? else {
            debug!("Branch {} has no upstream, nothing to fast-forward", branch);
            return Ok(false);
        };
        let full_name = format!("refs/heads/{branch}");
        let mut reference = self.repo.find_reference(&full_name)?;
        let Some(local) = reference.target() else {
            return Ok(false);
        };
        if local == upstream {
            return Ok(false);
        }

        match self.repo.graph_ahead_behind(local, upstream)? {
            (0, _) => {
                let target = self.repo.find_commit(upstream)?;
                let mut checkout = CheckoutBuilder::new();
                checkout.safe();
                self.repo.checkout_tree(target.as_object(), Some(&mut checkout))?;
                reference.set_target(upstream, &format!("fast-forward {branch} to {REMOTE_NAME}"))?;
                info!("Fast-forwarded {} to {} ({})", branch, REMOTE_NAME, upstream);
                Ok(true)
            }
            (_, 0) => Ok(false),
            (ahead, behind) => Err(VcError::InvalidOperation(format!(
                "Branch '{branch}' has diverged from {REMOTE_NAME} ({ahead} ahead, {behind} behind); pull first"
            ))),
        }
    }

    fn merge(&self, commit: Oid, favor: MergeFavor, message: &str) -> VcResult<MergeStatus> {
        let annotated = self.repo.find_annotated_commit(commit)?;
        let (analysis, _preference) = self.repo.merge_analysis(&[&annotated])?;

        if analysis.is_up_to_date() {
            return Ok(MergeStatus::UpToDate);
        }
        if analysis.is_unborn() {
            return Err(VcError::InvalidOperation("Cannot merge into a branch without commits".to_string()));
        }

        if analysis.is_fast_forward() {
            let target = self.repo.find_commit(commit)?;
            let mut checkout = CheckoutBuilder::new();
            checkout.safe();
            self.repo.checkout_tree(target.as_object(), Some(&mut checkout))?;
            let mut head = self.repo.head()?;
            head.set_target(commit, &format!("merge: fast-forward ({message})"))?;
            info!("Fast-forwarded to {}", commit);
            return Ok(MergeStatus::FastForward(commit));
        }

        let mut merge_opts = MergeOptions::new();
        if favor == MergeFavor::Source {
            merge_opts.file_favor(FileFavor::Theirs);
        }
        self.repo.merge(&[&annotated], Some(&mut merge_opts), None)?;

        let mut index = self.repo.index()?;
        if index.has_conflicts() {
            let paths: Vec<String> = index
                .conflicts()?
                .filter_map(Result::ok)
                .filter_map(|conflict| conflict.our.or(conflict.their).or(conflict.ancestor))
                .map(|entry| String::from_utf8_lossy(&entry.path).into_owned())
                .collect();
            warn!("Merge of {} left conflicts in {:?}, aborting", commit, paths);
            self.abort_merge()?;
            return Ok(MergeStatus::Conflicts(paths));
        }

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.author.signature()?;
        let head_commit = self.repo.head()?.peel_to_commit()?;
        let source_commit = self.repo.find_commit(commit)?;
        let merge_id = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&head_commit, &source_commit],
        )?;
        self.repo.cleanup_state()?;

        info!("Created merge commit {} ({:?})", merge_id, favor);
        Ok(MergeStatus::Merged(merge_id))
    }

    fn push(&self, remote: &str, refspec: &str) -> VcResult<()> {
        let mut remote = self
            .repo
            .find_remote(remote)
            .map_err(|e| VcError::PushFailed(format!("remote '{remote}' not found: {}", e.message())))?;

        let mut rejected: Option<String> = None;
        {
            let mut callbacks = RemoteCallbacks::new();
            callbacks.push_update_reference(|reference, status| {
                if let Some(message) = status {
                    rejected = Some(format!("{reference}: {message}"));
                }
                Ok(())
            });
            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);

            remote
                .push(&[refspec], Some(&mut options))
                .map_err(|e| VcError::PushFailed(e.message().to_string()))?;
        }

        if let Some(reason) = rejected {
            return Err(VcError::PushFailed(reason));
        }
        info!("Pushed {} to {}", refspec, remote.name().unwrap_or(REMOTE_NAME));
        Ok(())
    }
}

/// Git branch name rules enforced before creating a branch.
pub fn validate_branch_name(name: &str) -> VcResult<()> {
    if name.is_empty() {
        return Err(VcError::InvalidBranchName("Branch name cannot be empty".to_string()));
    }

    let invalid_chars = [' ', '~', '^', ':', '?', '*', '[', '\\'];
    if name.chars().any(|c| invalid_chars.contains(&c)) {
        return Err(VcError::InvalidBranchName(format!(
            "Branch name contains invalid characters: {name}"
        )));
    }

    if name.starts_with('-') || name.ends_with('/') || name.contains("//") {
        return Err(VcError::InvalidBranchName(format!("Invalid branch name format: {name}")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo(path: &Path) -> GitRepository {
        let repo = Repository::init(path).unwrap();
        let handle = GitRepository::new(repo, Author::default());
        fs::write(path.join("README.md"), "# Test Repository\n").unwrap();
        handle.commit_all("Initial commit", &Author::default()).unwrap();
        handle
    }

    #[test]
    fn test_validate_branch_name() {
        assert!(validate_branch_name("valid-branch").is_ok());
        assert!(validate_branch_name("feature/test").is_ok());
        assert!(validate_branch_name("").is_err());
        assert!(validate_branch_name("invalid branch").is_err());
        assert!(validate_branch_name("invalid~branch").is_err());
        assert!(validate_branch_name("-leading").is_err());
        assert!(validate_branch_name("double//slash").is_err());
    }

    #[test]
    fn test_commit_all_refuses_empty_commit() {
        let temp_dir = TempDir::new().unwrap();
        let repo = create_test_repo(temp_dir.path());

        let err = repo.commit_all("nothing", &Author::default()).unwrap_err();
        assert!(matches!(err, VcError::InvalidOperation(_)));
    }

    #[test]
    fn test_status_reports_untracked_and_modified() {
        let temp_dir = TempDir::new().unwrap();
        let repo = create_test_repo(temp_dir.path());
        fs::write(temp_dir.path().join("README.md"), "changed\n").unwrap();
        fs::write(temp_dir.path().join("new.txt"), "new\n").unwrap();

        let status = repo.status().unwrap();
        assert_eq!(status.modified, vec!["README.md".to_string()]);
        assert_eq!(status.untracked, vec!["new.txt".to_string()]);
        assert!(status.is_dirty);
        assert_eq!(status.commits_ahead, 0);
    }

    #[test]
    fn test_discard_changes_restores_clean_tree() {
        let temp_dir = TempDir::new().unwrap();
        let repo = create_test_repo(temp_dir.path());
        fs::write(temp_dir.path().join("README.md"), "changed\n").unwrap();
        fs::write(temp_dir.path().join("new.txt"), "new\n").unwrap();

        repo.discard_changes().unwrap();

        assert!(!repo.status().unwrap().is_dirty);
        assert!(!temp_dir.path().join("new.txt").exists());
    }

    #[test]
    fn test_resolve_branch_and_lookup_commit() {
        let temp_dir = TempDir::new().unwrap();
        let repo = create_test_repo(temp_dir.path());
        repo.create_branch("feature").unwrap();
        let head = repo.head_commit().unwrap().unwrap();

        let resolved = repo.resolve_branch("feature").unwrap().unwrap();
        assert_eq!(resolved.reference, "refs/heads/feature");
        assert_eq!(resolved.commit, head);
        assert!(repo.resolve_branch("missing").unwrap().is_none());

        assert_eq!(repo.lookup_commit(&head.to_string()).unwrap(), Some(head));
        assert_eq!(repo.lookup_commit(&head.to_string()[..10]).unwrap(), Some(head));
        assert_eq!(repo.lookup_commit("feature").unwrap(), None);
        assert_eq!(repo.lookup_commit(&"0".repeat(40)).unwrap(), None);
    }

    #[test]
    fn test_read_blob_missing_path_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let repo = create_test_repo(temp_dir.path());
        let head = repo.head_commit().unwrap().unwrap();

        assert!(repo.read_blob_at_commit(head, WORKFLOW_FILE_NAME).unwrap().is_none());
        assert_eq!(
            repo.read_blob_at_commit(head, "README.md").unwrap(),
            Some(b"# Test Repository\n".to_vec())
        );
    }

    #[test]
    fn test_commit_history_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let repo = create_test_repo(temp_dir.path());
        fs::write(temp_dir.path().join("README.md"), "second\n").unwrap();
        repo.commit_all("Second commit", &Author::new("Alice", "alice@example.com")).unwrap();

        let history = repo.commit_history(10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].message, "Second commit");
        assert_eq!(history[0].author, "Alice");
    }
}
