// ABOUTME: Workflow document tree (workflow -> phase -> task) persisted as one JSON file per repository
// Carries the derived change annotation used by the pending-changes view

use serde::{Deserialize, Serialize};

/// Derived, never-persisted classification of a node relative to a baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    #[default]
    None,
    Added,
    Modified,
    Deleted,
}

impl ChangeStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            ChangeStatus::None => " ",
            ChangeStatus::Added => "A",
            ChangeStatus::Modified => "M",
            ChangeStatus::Deleted => "D",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ChangeStatus::None)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProgramWorkflows {
    #[serde(default)]
    pub workflows: Vec<Workflow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Workflow {
    #[serde(default)]
    pub workflow_name: String,
    #[serde(default)]
    pub workflow_key: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default, skip_serializing_if = "ChangeStatus::is_none")]
    pub change_status: ChangeStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Phase {
    #[serde(default)]
    pub phase_name: String,
    #[serde(default)]
    pub phase_order: i32,
    #[serde(default)]
    pub tasks: Vec<TaskItem>,
    #[serde(default, skip_serializing_if = "ChangeStatus::is_none")]
    pub change_status: ChangeStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskItem {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub task_name: String,
    #[serde(default)]
    pub task_type: String,
    #[serde(default)]
    pub assigned_role: String,
    #[serde(default)]
    pub estimated_duration_hours: f64,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub is_automated: bool,
    #[serde(default, skip_serializing_if = "ChangeStatus::is_none")]
    pub change_status: ChangeStatus,
}

/// Node counts per change classification, mirroring `git status --short` totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    pub added: u32,
    pub modified: u32,
    pub deleted: u32,
}

impl ChangeCounts {
    pub fn total(&self) -> u32 {
        self.added + self.modified + self.deleted
    }

    pub fn format(&self) -> String {
        if self.total() == 0 {
            "No changes".to_string()
        } else {
            format!("+{} ~{} -{}", self.added, self.modified, self.deleted)
        }
    }

    fn record(&mut self, status: ChangeStatus) {
        match status {
            ChangeStatus::Added => self.added += 1,
            ChangeStatus::Modified => self.modified += 1,
            ChangeStatus::Deleted => self.deleted += 1,
            ChangeStatus::None => {}
        }
    }
}

impl ProgramWorkflows {
    pub fn new(workflows: Vec<Workflow>) -> Self {
        Self { workflows }
    }

    pub fn find(&self, key: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| w.workflow_key == key)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.workflows.iter().position(|w| w.workflow_key == key)
    }

    /// Reset every annotation so the tree matches its stored form.
    pub fn clear_change_status(&mut self) {
        for workflow in &mut self.workflows {
            workflow.stamp(ChangeStatus::None);
        }
    }

    /// Removes nodes annotated `Deleted` at every level. They exist only in the diff view.
    pub fn drop_deleted(&mut self) {
        self.workflows.retain(|w| w.change_status != ChangeStatus::Deleted);
        for workflow in &mut self.workflows {
            workflow.phases.retain(|p| p.change_status != ChangeStatus::Deleted);
            for phase in &mut workflow.phases {
                phase.tasks.retain(|t| t.change_status != ChangeStatus::Deleted);
            }
        }
    }

    /// Counts annotated nodes at every level of the tree.
    pub fn change_summary(&self) -> ChangeCounts {
        let mut counts = ChangeCounts::default();
        for workflow in &self.workflows {
            counts.record(workflow.change_status);
            for phase in &workflow.phases {
                counts.record(phase.change_status);
                for task in &phase.tasks {
                    counts.record(task.change_status);
                }
            }
        }
        counts
    }
}

impl Workflow {
    /// Sets the status on this workflow and its whole subtree.
    pub fn stamp(&mut self, status: ChangeStatus) {
        self.change_status = status;
        for phase in &mut self.phases {
            phase.stamp(status);
        }
    }
}

impl Phase {
    pub fn stamp(&mut self, status: ChangeStatus) {
        self.change_status = status;
        for task in &mut self.tasks {
            task.change_status = status;
        }
    }
}

impl TaskItem {
    /// The task id when one is set and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.task_id.as_deref().filter(|id| !id.is_empty())
    }
}
