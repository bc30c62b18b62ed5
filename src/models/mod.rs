// ABOUTME: Core data models for workflow documents, repository status, and pull requests

pub mod git_status;
pub mod pull_request;
pub mod workflow;

pub use git_status::{CommitInfo, GitStatus};
pub use pull_request::{
    BranchComparison, ChangeType, CreatePullRequest, PullRequest, PullRequestStatus, WorkflowChange,
};
pub use workflow::{ChangeCounts, ChangeStatus, Phase, ProgramWorkflows, TaskItem, Workflow};
