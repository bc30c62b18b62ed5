// ABOUTME: Git-backed persistence: per-user clones, snapshots, branch comparison, and merging

pub mod compare;
pub mod error;
pub mod merge;
pub mod provider;
pub mod registry;
pub mod repository;
pub mod snapshot;

pub use compare::{workflow_changes, BranchComparator, Endpoint, Side};
pub use error::{VcError, VcResult};
pub use merge::MergeOrchestrator;
pub use provider::{GitProvider, MergeFavor, MergeStatus, ResolvedBranch};
pub use registry::{validate_user_id, RepositoryRegistry};
pub use repository::{validate_branch_name, Author, GitRepository, REMOTE_NAME};
pub use snapshot::{diff_against_last_commit, SnapshotReader, SnapshotRef};
