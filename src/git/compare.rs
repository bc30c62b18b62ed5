// ABOUTME: Branch-to-branch comparison at the workflow level
// Endpoints resolve to an explicit commit id when given, otherwise to the branch tip

use super::provider::GitProvider;
use super::snapshot::SnapshotReader;
use super::{VcError, VcResult};
use crate::codec::canonical_workflow;
use crate::models::{BranchComparison, ChangeType, ProgramWorkflows, WorkflowChange};
use git2::Oid;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Target => write!(f, "target"),
        }
    }
}

/// One side of a comparison: a branch name plus an optional pinned commit.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint<'a> {
    pub branch: &'a str,
    pub commit_id: Option<&'a str>,
}

impl<'a> Endpoint<'a> {
    pub fn branch(branch: &'a str) -> Self {
        Self { branch, commit_id: None }
    }

    pub fn pinned(branch: &'a str, commit_id: Option<&'a str>) -> Self {
        Self { branch, commit_id }
    }
}

pub struct BranchComparator<'a, P: GitProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: GitProvider + ?Sized> BranchComparator<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// A non-empty commit id wins over the branch name.
    pub fn resolve_endpoint(&self, side: Side, endpoint: Endpoint<'_>) -> VcResult<Oid> {
        let pinned = endpoint.commit_id.map(str::trim).filter(|id| !id.is_empty());
        if let Some(id) = pinned {
            return self
                .provider
                .lookup_commit(id)?
                .ok_or_else(|| VcError::InvalidReference(format!("{side} commit '{id}' not found")));
        }

        self.provider
            .resolve_branch(endpoint.branch)?
            .map(|resolved| resolved.commit)
            .ok_or_else(|| {
                VcError::InvalidReference(format!("{side} branch '{}' not found", endpoint.branch))
            })
    }

    /// Tip commit id of a branch, as a hex string.
    pub fn resolve_commit_id_for_branch(&self, branch: &str) -> VcResult<String> {
        Ok(self
            .resolve_endpoint(Side::Source, Endpoint::branch(branch))?
            .to_string())
    }

    pub fn compare(&self, source: Endpoint<'_>, target: Endpoint<'_>) -> VcResult<BranchComparison> {
        let source_commit = self.resolve_endpoint(Side::Source, source)?;
        let target_commit = self.resolve_endpoint(Side::Target, target)?;
        debug!(
            "Comparing {}@{} against {}@{}",
            source.branch, source_commit, target.branch, target_commit
        );

        let commits_ahead = self
            .provider
            .commits_reachable_excluding(source_commit, target_commit)?;

        let reader = SnapshotReader::new(self.provider);
        let source_doc = reader.read_for_comparison(source_commit)?;
        let target_doc = reader.read_for_comparison(target_commit)?;
        let changes = workflow_changes(&source_doc, &target_doc)?;

        info!(
            "{} is {} commit(s) ahead of {} with {} workflow change(s)",
            source.branch,
            commits_ahead,
            target.branch,
            changes.len()
        );

        Ok(BranchComparison {
            source_branch: source.branch.to_string(),
            target_branch: target.branch.to_string(),
            source_commit: source_commit.to_string(),
            target_commit: target_commit.to_string(),
            commits_ahead,
            changes,
        })
    }
}

/// Workflow-level changes from `target` to `source`, matched by key.
///
/// Source order first (added or modified), then target-only workflows as deleted.
pub fn workflow_changes(
    source: &ProgramWorkflows,
    target: &ProgramWorkflows,
) -> VcResult<Vec<WorkflowChange>> {
    let mut target_by_key = HashMap::new();
    for workflow in &target.workflows {
        target_by_key.entry(workflow.workflow_key.as_str()).or_insert(workflow);
    }

    let mut changes = Vec::new();
    let mut seen = HashSet::with_capacity(source.workflows.len());

    for workflow in &source.workflows {
        seen.insert(workflow.workflow_key.as_str());
        match target_by_key.get(workflow.workflow_key.as_str()) {
            None => changes.push(WorkflowChange {
                workflow_key: workflow.workflow_key.clone(),
                workflow_name: workflow.workflow_name.clone(),
                change_type: ChangeType::Added,
                source_workflow: Some(workflow.clone()),
                target_workflow: None,
            }),
            Some(previous) => {
                if canonical_workflow(workflow)? != canonical_workflow(previous)? {
                    changes.push(WorkflowChange {
                        workflow_key: workflow.workflow_key.clone(),
                        workflow_name: workflow.workflow_name.clone(),
                        change_type: ChangeType::Modified,
                        source_workflow: Some(workflow.clone()),
                        target_workflow: Some((*previous).clone()),
                    });
                }
            }
        }
    }

    for workflow in &target.workflows {
        if !seen.contains(workflow.workflow_key.as_str()) {
            changes.push(WorkflowChange {
                workflow_key: workflow.workflow_key.clone(),
                workflow_name: workflow.workflow_name.clone(),
                change_type: ChangeType::Deleted,
                source_workflow: None,
                target_workflow: Some(workflow.clone()),
            });
        }
    }

    Ok(changes)
}
