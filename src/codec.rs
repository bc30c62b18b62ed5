// ABOUTME: Decoding and encoding of the on-disk workflow document
// Tolerates the historical bare-array shape when decoding leniently

use crate::diff::ensure_ids;
use crate::git::{VcError, VcResult};
use crate::models::{ProgramWorkflows, Workflow};

/// Fixed name of the single document file at the repository root.
pub const WORKFLOW_FILE_NAME: &str = "workflows.json";

/// Decodes the expected `{ "Workflows": [...] }` shape only.
pub fn decode_document(bytes: &[u8]) -> VcResult<ProgramWorkflows> {
    if is_blank(bytes) {
        return Ok(ProgramWorkflows::default());
    }
    serde_json::from_slice::<ProgramWorkflows>(bytes)
        .map_err(|e| VcError::DecodeFailed(e.to_string()))
}

/// Decodes the expected shape, falling back to a bare array of workflows.
pub fn decode_document_lenient(bytes: &[u8]) -> VcResult<ProgramWorkflows> {
    if is_blank(bytes) {
        return Ok(ProgramWorkflows::default());
    }
    match serde_json::from_slice::<ProgramWorkflows>(bytes) {
        Ok(document) => Ok(document),
        Err(primary) => serde_json::from_slice::<Vec<Workflow>>(bytes)
            .map(ProgramWorkflows::new)
            .map_err(|fallback| {
                VcError::DecodeFailed(format!(
                    "not a workflow document ({primary}) nor a workflow list ({fallback})"
                ))
            }),
    }
}

/// Storage form: ids filled in, change annotations stripped, pretty-printed.
pub fn encode_document(document: &ProgramWorkflows) -> VcResult<Vec<u8>> {
    let mut stored = canonical(document);
    ensure_ids(&mut stored);
    let mut bytes = serde_json::to_vec_pretty(&stored)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Copy of the document as it is stored: deleted nodes removed, no change annotations.
pub fn canonical(document: &ProgramWorkflows) -> ProgramWorkflows {
    let mut stored = document.clone();
    stored.drop_deleted();
    stored.clear_change_status();
    stored
}

/// Canonical JSON value of one workflow, used for deep equality across snapshots.
pub fn canonical_workflow(workflow: &Workflow) -> VcResult<serde_json::Value> {
    let mut stored = workflow.clone();
    stored.stamp(crate::models::ChangeStatus::None);
    Ok(serde_json::to_value(&stored)?)
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangeStatus, Phase, TaskItem};

    const BARE_ARRAY: &str = r#"[{"WorkflowName":"Billing","WorkflowKey":"billing","Description":"","Phases":[]}]"#;

    #[test]
    fn test_strict_decode_reads_expected_shape() {
        let doc = decode_document(br#"{"Workflows":[{"WorkflowKey":"a"}]}"#).unwrap();
        assert_eq!(doc.workflows[0].workflow_key, "a");
    }

    #[test]
    fn test_strict_decode_rejects_bare_array() {
        let err = decode_document(BARE_ARRAY.as_bytes()).unwrap_err();
        assert!(matches!(err, VcError::DecodeFailed(_)));
    }

    #[test]
    fn test_lenient_decode_accepts_bare_array() {
        let doc = decode_document_lenient(BARE_ARRAY.as_bytes()).unwrap();
        assert_eq!(doc.workflows.len(), 1);
        assert_eq!(doc.workflows[0].workflow_key, "billing");
    }

    #[test]
    fn test_lenient_decode_fails_loudly_on_garbage() {
        let err = decode_document_lenient(b"{ not json").unwrap_err();
        assert!(matches!(err, VcError::DecodeFailed(_)));
    }

    #[test]
    fn test_blank_content_is_empty_document() {
        assert!(decode_document(b"  \n").unwrap().workflows.is_empty());
        assert!(decode_document_lenient(b"").unwrap().workflows.is_empty());
    }

    #[test]
    fn test_encoding_strips_change_status_and_fills_ids() {
        let mut doc = ProgramWorkflows::new(vec![Workflow {
            workflow_key: "k".to_string(),
            phases: vec![Phase {
                phase_name: "P".to_string(),
                tasks: vec![TaskItem { task_name: "T".to_string(), ..Default::default() }],
                ..Default::default()
            }],
            ..Default::default()
        }]);
        doc.workflows[0].stamp(ChangeStatus::Added);

        let bytes = encode_document(&doc).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(!text.contains("ChangeStatus"));

        let decoded = decode_document(&bytes).unwrap();
        assert!(decoded.workflows[0].phases[0].tasks[0].id().is_some());
        assert_eq!(decoded.change_summary().total(), 0);
    }

    #[test]
    fn test_encoding_drops_nodes_annotated_deleted() {
        let mut doc = ProgramWorkflows::new(vec![Workflow {
            workflow_key: "k".to_string(),
            phases: vec![Phase {
                phase_name: "P".to_string(),
                tasks: vec![
                    TaskItem { task_name: "Kept".to_string(), ..Default::default() },
                    TaskItem { task_name: "Removed".to_string(), ..Default::default() },
                ],
                ..Default::default()
            }],
            ..Default::default()
        }]);
        doc.workflows[0].phases[0].tasks[1].change_status = ChangeStatus::Deleted;

        let decoded = decode_document(&encode_document(&doc).unwrap()).unwrap();
        let tasks = &decoded.workflows[0].phases[0].tasks;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task_name, "Kept");
    }

    #[test]
    fn test_canonical_workflow_ignores_annotations() {
        let plain = Workflow { workflow_key: "k".to_string(), ..Default::default() };
        let mut annotated = plain.clone();
        annotated.stamp(ChangeStatus::Modified);

        assert_eq!(canonical_workflow(&plain).unwrap(), canonical_workflow(&annotated).unwrap());
    }
}
