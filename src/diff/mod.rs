// ABOUTME: Structural change tracking for workflow documents
// Assigns stable task identities and annotates nodes against a baseline snapshot

pub mod identity;
pub mod structural;

pub use identity::{derive_task_id, ensure_ids};
pub use structural::{diff_documents, pair, Diffable, NodeChange};
