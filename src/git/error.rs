// ABOUTME: Error types for repository, diff, comparison, merge, and pull request operations
// Resolution and merge failures carry the branch/commit/side they concern

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcError {
    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Merge conflicts detected in: {}", .0.join(", "))]
    MergeConflict(Vec<String>),

    #[error("Failed to push to remote: {0}")]
    PushFailed(String),

    #[error("Snapshot could not be decoded, change annotations skipped: {0}")]
    DecodeDegraded(String),

    #[error("Workflow document could not be decoded: {0}")]
    DecodeFailed(String),

    #[error("Invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("Invalid user id: {0}")]
    InvalidUser(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    #[error("Workflow with key '{0}' already exists")]
    WorkflowExists(String),

    #[error("Pull request #{0} not found")]
    PullRequestNotFound(u32),

    #[error("Pull request #{0} is not open")]
    PullRequestNotOpen(u32),
}

impl VcError {
    /// Whether repeating the same call could succeed without changing its input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VcError::PushFailed(_) | VcError::Io(_) | VcError::Task(_))
    }
}

pub type VcResult<T> = Result<T, VcError>;
