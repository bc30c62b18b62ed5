// ABOUTME: Structural diff of two workflow documents, annotating each node added/modified/deleted
// Nodes are paired per level by matching key, then flattened back into one ordered sequence

use crate::models::{ChangeStatus, Phase, ProgramWorkflows, TaskItem, Workflow};
use std::collections::HashMap;
use std::hash::Hash;

/// Pairing result for one node. `Modified` keeps the baseline alongside the current node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange<T> {
    Unchanged(T),
    Added(T),
    Modified(T, T),
    Deleted(T),
}

/// A level of the document tree that can be paired against its baseline.
pub trait Diffable: Clone {
    type Key: Eq + Hash;

    /// `None` means the node can never be matched (e.g. a task without id).
    fn match_key(&self) -> Option<Self::Key>;

    /// Compares the scalar fields owned by this level, ignoring children.
    fn same_fields(&self, other: &Self) -> bool;

    fn set_status(&mut self, status: ChangeStatus);

    /// Sets the status on this node and every descendant.
    fn stamp(&mut self, status: ChangeStatus);

    /// Diffs children in place against the matched baseline node.
    fn diff_children(&mut self, previous: &Self);
}

impl<T: Diffable> NodeChange<T> {
    pub fn status(&self) -> ChangeStatus {
        match self {
            NodeChange::Unchanged(_) => ChangeStatus::None,
            NodeChange::Added(_) => ChangeStatus::Added,
            NodeChange::Modified(..) => ChangeStatus::Modified,
            NodeChange::Deleted(_) => ChangeStatus::Deleted,
        }
    }

    /// Flattens the variant into the annotated node the caller renders.
    pub fn into_annotated(self) -> T {
        match self {
            NodeChange::Unchanged(mut node) => {
                node.set_status(ChangeStatus::None);
                node
            }
            NodeChange::Modified(mut node, _) => {
                node.set_status(ChangeStatus::Modified);
                node
            }
            NodeChange::Added(mut node) => {
                node.stamp(ChangeStatus::Added);
                node
            }
            NodeChange::Deleted(mut node) => {
                node.stamp(ChangeStatus::Deleted);
                node
            }
        }
    }
}

/// Pairs `current` with `previous` by matching key.
///
/// Matched nodes have their children diffed before classification. Baseline
/// nodes that found no counterpart are appended after all current nodes, in
/// their baseline order.
pub fn pair<T: Diffable>(current: Vec<T>, previous: &[T]) -> Vec<NodeChange<T>> {
    let mut baseline: HashMap<T::Key, usize> = HashMap::new();
    for (index, node) in previous.iter().enumerate() {
        if let Some(key) = node.match_key() {
            baseline.entry(key).or_insert(index);
        }
    }

    let mut matched = vec![false; previous.len()];
    let mut changes = Vec::with_capacity(current.len());

    for mut node in current {
        let counterpart = node.match_key().and_then(|key| baseline.get(&key).copied());
        let change = match counterpart {
            Some(index) => {
                matched[index] = true;
                let prev = &previous[index];
                node.diff_children(prev);
                if node.same_fields(prev) {
                    NodeChange::Unchanged(node)
                } else {
                    NodeChange::Modified(node, prev.clone())
                }
            }
            None => NodeChange::Added(node),
        };
        changes.push(change);
    }

    changes.extend(
        previous
            .iter()
            .zip(&matched)
            .filter(|(_, was_matched)| !**was_matched)
            .map(|(node, _)| NodeChange::Deleted(node.clone())),
    );

    changes
}

fn diff_level<T: Diffable>(current: Vec<T>, previous: &[T]) -> Vec<T> {
    pair(current, previous)
        .into_iter()
        .map(NodeChange::into_annotated)
        .collect()
}

/// Annotates `current` against `previous`. Both trees must already be id-complete.
pub fn diff_documents(current: ProgramWorkflows, previous: &ProgramWorkflows) -> ProgramWorkflows {
    ProgramWorkflows::new(diff_level(current.workflows, &previous.workflows))
}

impl Diffable for Workflow {
    type Key = String;

    fn match_key(&self) -> Option<String> {
        Some(self.workflow_key.clone())
    }

    fn same_fields(&self, other: &Self) -> bool {
        self.workflow_name == other.workflow_name && self.description == other.description
    }

    fn set_status(&mut self, status: ChangeStatus) {
        self.change_status = status;
    }

    fn stamp(&mut self, status: ChangeStatus) {
        Workflow::stamp(self, status);
    }

    fn diff_children(&mut self, previous: &Self) {
        let phases = std::mem::take(&mut self.phases);
        self.phases = diff_level(phases, &previous.phases);
    }
}

impl Diffable for Phase {
    type Key = (String, i32);

    fn match_key(&self) -> Option<(String, i32)> {
        Some((self.phase_name.clone(), self.phase_order))
    }

    fn same_fields(&self, other: &Self) -> bool {
        self.phase_name == other.phase_name && self.phase_order == other.phase_order
    }

    fn set_status(&mut self, status: ChangeStatus) {
        self.change_status = status;
    }

    fn stamp(&mut self, status: ChangeStatus) {
        Phase::stamp(self, status);
    }

    fn diff_children(&mut self, previous: &Self) {
        let tasks = std::mem::take(&mut self.tasks);
        self.tasks = diff_level(tasks, &previous.tasks);
    }
}

impl Diffable for TaskItem {
    type Key = String;

    fn match_key(&self) -> Option<String> {
        self.id().map(str::to_string)
    }

    #[allow(clippy::float_cmp)]
    fn same_fields(&self, other: &Self) -> bool {
        self.task_name == other.task_name
            && self.task_type == other.task_type
            && self.assigned_role == other.assigned_role
            && self.estimated_duration_hours == other.estimated_duration_hours
            && self.is_automated == other.is_automated
            && self.dependencies == other.dependencies
    }

    fn set_status(&mut self, status: ChangeStatus) {
        self.change_status = status;
    }

    fn stamp(&mut self, status: ChangeStatus) {
        self.change_status = status;
    }

    fn diff_children(&mut self, _previous: &Self) {}
}
