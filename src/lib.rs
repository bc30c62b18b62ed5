// ABOUTME: Library crate for Git-backed workflow configuration: change tracking, branch comparison, merging, and pull requests

pub mod codec;
pub mod config;
pub mod diff;
pub mod git;
pub mod models;
pub mod pull_requests;
pub mod service;
