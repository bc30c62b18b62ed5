// ABOUTME: Reads the workflow document from the working copy or from a commit snapshot
// Also computes the pending-changes view of the working copy against HEAD

use super::provider::GitProvider;
use super::{VcError, VcResult};
use crate::codec::{decode_document, decode_document_lenient, WORKFLOW_FILE_NAME};
use crate::diff::{diff_documents, ensure_ids};
use crate::models::ProgramWorkflows;
use git2::Oid;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotRef {
    WorkingCopy,
    Commit(Oid),
}

pub struct SnapshotReader<'a, P: GitProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: GitProvider + ?Sized> SnapshotReader<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    fn raw(&self, at: SnapshotRef) -> VcResult<Option<Vec<u8>>> {
        match at {
            SnapshotRef::WorkingCopy => self.provider.read_working_tree_file(WORKFLOW_FILE_NAME),
            SnapshotRef::Commit(commit) => self.provider.read_blob_at_commit(commit, WORKFLOW_FILE_NAME),
        }
    }

    /// Strict read. A missing file is an empty document.
    pub fn read(&self, at: SnapshotRef) -> VcResult<ProgramWorkflows> {
        let mut document = match self.raw(at)? {
            Some(bytes) => decode_document(&bytes)?,
            None => {
                debug!("No {} at {:?}, using empty document", WORKFLOW_FILE_NAME, at);
                ProgramWorkflows::default()
            }
        };
        ensure_ids(&mut document);
        Ok(document)
    }

    /// Strict read of a committed baseline; undecodable content is reported as degraded.
    pub fn read_baseline(&self, commit: Oid) -> VcResult<ProgramWorkflows> {
        self.read(SnapshotRef::Commit(commit)).map_err(|e| match e {
            VcError::DecodeFailed(reason) => VcError::DecodeDegraded(reason),
            other => other,
        })
    }

    /// Lenient read used when comparing branches; accepts the bare-array shape.
    pub fn read_for_comparison(&self, commit: Oid) -> VcResult<ProgramWorkflows> {
        let mut document = match self.raw(SnapshotRef::Commit(commit))? {
            Some(bytes) => decode_document_lenient(&bytes)?,
            None => ProgramWorkflows::default(),
        };
        ensure_ids(&mut document);
        Ok(document)
    }
}

/// Working copy annotated against the last commit.
///
/// Without a HEAD commit, or when the committed document cannot be decoded,
/// the working copy is returned with ids filled in and no annotations.
pub fn diff_against_last_commit<P: GitProvider + ?Sized>(provider: &P) -> VcResult<ProgramWorkflows> {
    let reader = SnapshotReader::new(provider);
    let current = reader.read(SnapshotRef::WorkingCopy)?;

    let Some(head) = provider.head_commit()? else {
        debug!("No commits yet, returning working copy unannotated");
        return Ok(current);
    };

    match reader.read_baseline(head) {
        Ok(previous) => Ok(diff_documents(current, &previous)),
        Err(VcError::DecodeDegraded(reason)) => {
            warn!("Committed document at {} is unreadable, skipping change tracking: {}", head, reason);
            Ok(current)
        }
        Err(e) => Err(e),
    }
}
