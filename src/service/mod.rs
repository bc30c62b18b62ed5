// ABOUTME: Async entry point used by the CLI, serializing work per user

pub mod user_locks;
pub mod workflow_service;

pub use user_locks::UserLocks;
pub use workflow_service::WorkflowService;
