// ABOUTME: Shared fixtures for integration tests: a seeded central repository and per-user clones

#![allow(dead_code)]

use tempfile::TempDir;
use workflow_config::config::AppConfig;
use workflow_config::git::{Author, GitRepository, RepositoryRegistry};
use workflow_config::models::{Phase, ProgramWorkflows, TaskItem, Workflow};

pub struct Fixture {
    pub temp_dir: TempDir,
    pub config: AppConfig,
    pub registry: RepositoryRegistry,
}

impl Fixture {
    pub fn seeded() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = AppConfig::rooted_at(temp_dir.path());
        let registry = RepositoryRegistry::new(&config);
        registry
            .seed_central(&sample_document())
            .expect("Failed to seed central repository");
        Self { temp_dir, config, registry }
    }

    pub fn open(&self, user: &str) -> GitRepository {
        self.registry.open(user).expect("Failed to open user repository")
    }
}

pub fn author() -> Author {
    Author::new("Test User", "test@example.com")
}

pub fn task(name: &str) -> TaskItem {
    TaskItem {
        task_name: name.to_string(),
        task_type: "manual".to_string(),
        assigned_role: "analyst".to_string(),
        estimated_duration_hours: 2.0,
        ..Default::default()
    }
}

pub fn sample_document() -> ProgramWorkflows {
    ProgramWorkflows::new(vec![Workflow {
        workflow_name: "Customer Onboarding".to_string(),
        workflow_key: "onboarding".to_string(),
        description: "Bring a new customer live".to_string(),
        phases: vec![
            Phase {
                phase_name: "Intake".to_string(),
                phase_order: 1,
                tasks: vec![task("Collect documents"), task("Verify identity")],
                ..Default::default()
            },
            Phase {
                phase_name: "Setup".to_string(),
                phase_order: 2,
                tasks: vec![task("Create account")],
                ..Default::default()
            },
        ],
        ..Default::default()
    }])
}

/// Applies `edit` to the committed working copy document, writes it back, and commits.
pub fn commit_edit(repo: &GitRepository, message: &str, edit: impl FnOnce(&mut ProgramWorkflows)) {
    use workflow_config::git::{SnapshotReader, SnapshotRef};

    let mut document = SnapshotReader::new(repo)
        .read(SnapshotRef::WorkingCopy)
        .expect("Failed to read working copy");
    edit(&mut document);
    repo.write_workflows(&document).expect("Failed to write workflows");
    repo.commit_all(message, &author()).expect("Failed to commit");
}
