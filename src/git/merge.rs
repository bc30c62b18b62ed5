// ABOUTME: Merges a source branch into a target branch and publishes the result to origin
// Textual conflicts are resolved in favor of the source side

use super::provider::{GitProvider, MergeFavor, MergeStatus};
use super::repository::REMOTE_NAME;
use super::{VcError, VcResult};
use tracing::{info, warn};

pub struct MergeOrchestrator<'a, P: GitProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: GitProvider + ?Sized> MergeOrchestrator<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Leaves the working copy on the target branch. The push happens only for a clean merge.
    pub fn merge_branches(&self, source_branch: &str, target_branch: &str, message: &str) -> VcResult<MergeStatus> {
        let source = self
            .provider
            .resolve_branch(source_branch)?
            .ok_or_else(|| VcError::InvalidReference(format!("source branch '{source_branch}' not found")))?;
        let target = self
            .provider
            .resolve_branch(target_branch)?
            .ok_or_else(|| VcError::InvalidReference(format!("target branch '{target_branch}' not found")))?;

        let local_target = self.provider.checkout(&target.reference)?;
        if self.provider.fast_forward_to_upstream(&local_target)? {
            info!("Caught {} up with {} before merging", local_target, REMOTE_NAME);
        }
        let status = self.provider.merge(source.commit, MergeFavor::Source, message)?;

        if let MergeStatus::Conflicts(paths) = status {
            warn!("Merging {} into {} left conflicts: {:?}", source_branch, local_target, paths);
            return Err(VcError::MergeConflict(paths));
        }

        let refspec = format!("refs/heads/{local_target}:refs/heads/{local_target}");
        self.provider.push(REMOTE_NAME, &refspec)?;

        info!("Merged {} into {} ({:?})", source_branch, local_target, status);
        Ok(status)
    }
}
