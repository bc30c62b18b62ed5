// ABOUTME: Working-copy status and commit history records for a user's repository

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitStatus {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
    pub untracked: Vec<String>,
    pub current_branch: String,
    pub is_dirty: bool,
    pub commits_ahead: usize,
    pub commits_behind: usize,
}

impl GitStatus {
    pub fn changed_paths(&self) -> impl Iterator<Item = &String> {
        self.added
            .iter()
            .chain(&self.modified)
            .chain(&self.removed)
            .chain(&self.untracked)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub date: DateTime<Utc>,
}
