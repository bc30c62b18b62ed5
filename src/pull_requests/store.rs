// ABOUTME: Pull request persistence in a single JSON file shared by all users
// Read-modify-write cycles are serialized through an in-process lock

use crate::git::{VcError, VcResult};
use crate::models::{CreatePullRequest, PullRequest, PullRequestStatus};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

pub const PULL_REQUESTS_FILE_NAME: &str = "pull_requests.json";

pub struct PullRequestStore {
    storage_path: PathBuf,
    write_lock: Mutex<()>,
}

impl PullRequestStore {
    pub fn new(storage_dir: &Path) -> Self {
        Self {
            storage_path: storage_dir.join(PULL_REQUESTS_FILE_NAME),
            write_lock: Mutex::new(()),
        }
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    fn load_all(&self) -> VcResult<Vec<PullRequest>> {
        if !self.storage_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.storage_path)?;
        if content.trim().is_empty() {
            warn!("Pull request file {:?} is empty", self.storage_path);
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save_all(&self, pull_requests: &[PullRequest]) -> VcResult<()> {
        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(pull_requests)?;
        fs::write(&self.storage_path, json)?;
        Ok(())
    }

    /// Newest first; `status` is matched case-insensitively and unknown values match nothing.
    pub fn list(&self, status: Option<&str>) -> VcResult<Vec<PullRequest>> {
        let mut pull_requests = self.load_all()?;
        if let Some(filter) = status {
            let wanted = PullRequestStatus::parse(filter);
            pull_requests.retain(|pr| Some(pr.status) == wanted);
        }
        pull_requests.sort_by(|a, b| b.number.cmp(&a.number));
        Ok(pull_requests)
    }

    pub fn get(&self, number: u32) -> VcResult<PullRequest> {
        self.load_all()?
            .into_iter()
            .find(|pr| pr.number == number)
            .ok_or(VcError::PullRequestNotFound(number))
    }

    pub fn create(
        &self,
        author: &str,
        request: CreatePullRequest,
        source_commit_sha: String,
        target_commit_sha: String,
    ) -> VcResult<PullRequest> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut pull_requests = self.load_all()?;

        let number = pull_requests.iter().map(|pr| pr.number).max().unwrap_or(0) + 1;
        let pull_request = PullRequest {
            number,
            title: request.title,
            description: request.description,
            source_branch: request.source_branch,
            target_branch: request.target_branch,
            status: PullRequestStatus::Open,
            author: author.to_string(),
            created_date: Utc::now(),
            merged_date: None,
            source_commit_sha: Some(source_commit_sha),
            target_commit_sha: Some(target_commit_sha),
        };

        pull_requests.push(pull_request.clone());
        self.save_all(&pull_requests)?;

        info!(
            "Created pull request #{} ({} -> {}) by {}",
            number, pull_request.source_branch, pull_request.target_branch, author
        );
        Ok(pull_request)
    }

    pub fn mark_merged(&self, number: u32) -> VcResult<PullRequest> {
        self.transition(number, |pr| {
            pr.status = PullRequestStatus::Merged;
            pr.merged_date = Some(Utc::now());
        })
    }

    pub fn close(&self, number: u32) -> VcResult<PullRequest> {
        self.transition(number, |pr| pr.status = PullRequestStatus::Closed)
    }

    fn transition(&self, number: u32, apply: impl FnOnce(&mut PullRequest)) -> VcResult<PullRequest> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut pull_requests = self.load_all()?;

        let pull_request = pull_requests
            .iter_mut()
            .find(|pr| pr.number == number)
            .ok_or(VcError::PullRequestNotFound(number))?;
        if !pull_request.status.is_open() {
            return Err(VcError::PullRequestNotOpen(number));
        }
        apply(pull_request);
        let updated = pull_request.clone();

        self.save_all(&pull_requests)?;
        info!("Pull request #{} is now {}", number, updated.status.as_str());
        Ok(updated)
    }
}
