// ABOUTME: Pull request records and the branch comparison result shown for them

use super::Workflow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestStatus {
    Open,
    Merged,
    Closed,
}

impl PullRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullRequestStatus::Open => "open",
            PullRequestStatus::Merged => "merged",
            PullRequestStatus::Closed => "closed",
        }
    }

    /// Case-insensitive parse, used by status filters.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "open" => Some(PullRequestStatus::Open),
            "merged" => Some(PullRequestStatus::Merged),
            "closed" => Some(PullRequestStatus::Closed),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, PullRequestStatus::Open)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub number: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub source_branch: String,
    pub target_branch: String,
    pub status: PullRequestStatus,
    pub author: String,
    pub created_date: DateTime<Utc>,
    #[serde(default)]
    pub merged_date: Option<DateTime<Utc>>,
    /// Source tip frozen when the PR was opened.
    #[serde(default)]
    pub source_commit_sha: Option<String>,
    /// Target tip frozen when the PR was opened.
    #[serde(default)]
    pub target_commit_sha: Option<String>,
}

impl PullRequest {
    /// Commit ids to compare with: frozen for merged PRs, live tips otherwise.
    pub fn comparison_commits(&self) -> (Option<&str>, Option<&str>) {
        match self.status {
            PullRequestStatus::Merged => (
                self.source_commit_sha.as_deref(),
                self.target_commit_sha.as_deref(),
            ),
            PullRequestStatus::Open | PullRequestStatus::Closed => (None, None),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePullRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub source_branch: String,
    pub target_branch: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowChange {
    pub workflow_key: String,
    pub workflow_name: String,
    pub change_type: ChangeType,
    pub source_workflow: Option<Workflow>,
    pub target_workflow: Option<Workflow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchComparison {
    pub source_branch: String,
    pub target_branch: String,
    pub source_commit: String,
    pub target_commit: String,
    pub commits_ahead: usize,
    pub changes: Vec<WorkflowChange>,
}
