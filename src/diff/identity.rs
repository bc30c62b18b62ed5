// ABOUTME: Content-derived task identities so tasks can be matched across document versions
// Ids come from a SHA-256 of the task's position and name, never from clocks or randomness

use crate::models::ProgramWorkflows;
use sha2::{Digest, Sha256};
use uuid::Uuid;

const FIELD_SEPARATOR: &str = "|";

/// Fills in an id for every task that lacks one. Existing non-empty ids are kept.
pub fn ensure_ids(document: &mut ProgramWorkflows) {
    for workflow in &mut document.workflows {
        for phase in &mut workflow.phases {
            for (index, task) in phase.tasks.iter_mut().enumerate() {
                if task.id().is_some() {
                    continue;
                }
                task.task_id = Some(derive_task_id(
                    &workflow.workflow_key,
                    &phase.phase_name,
                    phase.phase_order,
                    &task.task_name,
                    index,
                ));
            }
        }
    }
}

/// UUID built from the first 16 bytes of the SHA-256 over the task's coordinates.
pub fn derive_task_id(
    workflow_key: &str,
    phase_name: &str,
    phase_order: i32,
    task_name: &str,
    task_index: usize,
) -> String {
    let material = [
        workflow_key.to_string(),
        phase_name.to_string(),
        phase_order.to_string(),
        task_name.to_string(),
        task_index.to_string(),
    ]
    .join(FIELD_SEPARATOR);

    let digest = Sha256::digest(material.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Phase, TaskItem, Workflow};

    fn sample() -> ProgramWorkflows {
        ProgramWorkflows::new(vec![Workflow {
            workflow_name: "Onboarding".to_string(),
            workflow_key: "onboarding".to_string(),
            phases: vec![Phase {
                phase_name: "Intake".to_string(),
                phase_order: 1,
                tasks: vec![
                    TaskItem { task_name: "Review".to_string(), ..Default::default() },
                    TaskItem { task_name: "Review".to_string(), ..Default::default() },
                    TaskItem {
                        task_id: Some("explicit-id".to_string()),
                        task_name: "Approve".to_string(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        }])
    }

    fn ids(doc: &ProgramWorkflows) -> Vec<String> {
        doc.workflows[0].phases[0]
            .tasks
            .iter()
            .map(|t| t.task_id.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_ids_are_deterministic_across_reads() {
        let mut first = sample();
        let mut second = sample();
        ensure_ids(&mut first);
        ensure_ids(&mut second);

        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_ensure_ids_is_idempotent() {
        let mut doc = sample();
        ensure_ids(&mut doc);
        let once = doc.clone();
        ensure_ids(&mut doc);

        assert_eq!(doc, once);
    }

    #[test]
    fn test_existing_ids_are_never_overwritten() {
        let mut doc = sample();
        ensure_ids(&mut doc);

        assert_eq!(ids(&doc)[2], "explicit-id");
    }

    #[test]
    fn test_same_name_at_different_index_gets_distinct_id() {
        let mut doc = sample();
        ensure_ids(&mut doc);
        let ids = ids(&doc);

        assert!(!ids[0].is_empty());
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_empty_id_is_replaced() {
        let mut doc = sample();
        doc.workflows[0].phases[0].tasks[0].task_id = Some(String::new());
        ensure_ids(&mut doc);

        assert!(doc.workflows[0].phases[0].tasks[0].id().is_some());
    }

    #[test]
    fn test_derived_id_is_uuid_formatted() {
        let id = derive_task_id("wf", "Intake", 1, "Review", 0);

        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(id, derive_task_id("wf", "Intake", 1, "Review", 0));
        assert_ne!(id, derive_task_id("wf", "Intake", 2, "Review", 0));
    }
}
