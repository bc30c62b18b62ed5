// ABOUTME: Lightweight pull requests between branches of the shared repository

pub mod service;
pub mod store;

pub use service::PullRequestService;
pub use store::{PullRequestStore, PULL_REQUESTS_FILE_NAME};
