// ABOUTME: Shared central repository plus one isolated clone per user
// Handles are opened fresh for every operation and never cached

use super::repository::{Author, GitRepository, REMOTE_NAME};
use super::{VcError, VcResult};
use crate::codec::WORKFLOW_FILE_NAME;
use crate::config::AppConfig;
use crate::models::ProgramWorkflows;
use git2::{Repository, RepositoryInitOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const SEED_COMMIT_MESSAGE: &str = "Initial commit: Add sample workflow data";

#[derive(Debug, Clone)]
pub struct RepositoryRegistry {
    repo_base_path: PathBuf,
    central_repo_path: PathBuf,
    default_branch: String,
    author: Author,
}

impl RepositoryRegistry {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            repo_base_path: config.repo_base_path.clone(),
            central_repo_path: config.central_repo_path.clone(),
            default_branch: config.default_branch.clone(),
            author: config.author(),
        }
    }

    pub fn central_repo_path(&self) -> &Path {
        &self.central_repo_path
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    fn central_url(&self) -> String {
        self.central_repo_path.to_string_lossy().into_owned()
    }

    /// Creates the bare central repository when it does not exist yet.
    pub fn init_central(&self) -> VcResult<()> {
        if Repository::open_bare(&self.central_repo_path).is_ok() {
            return Ok(());
        }

        if let Some(parent) = self.central_repo_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut opts = RepositoryInitOptions::new();
        opts.bare(true).initial_head(&self.default_branch);
        Repository::init_opts(&self.central_repo_path, &opts)?;

        info!(
            "Initialized central repository at {} on {}",
            self.central_repo_path.display(),
            self.default_branch
        );
        Ok(())
    }

    /// Publishes `document` as the first commit on the default branch.
    /// Returns false when the central repository already holds a document.
    pub fn seed_central(&self, document: &ProgramWorkflows) -> VcResult<bool> {
        self.init_central()?;

        let staging = tempfile::Builder::new()
            .prefix("workflow-config-seed-")
            .tempdir()?;
        let repo = Repository::clone(&self.central_url(), staging.path())?;

        if staging.path().join(WORKFLOW_FILE_NAME).exists() {
            info!("Central repository already contains {}", WORKFLOW_FILE_NAME);
            return Ok(false);
        }

        let branch_ref = format!("refs/heads/{}", self.default_branch);
        repo.set_head(&branch_ref)?;

        let handle = GitRepository::new(repo, self.author.clone());
        handle.write_workflows(document)?;
        handle.commit_all(SEED_COMMIT_MESSAGE, &self.author)?;
        handle.push_current()?;

        info!("Seeded central repository with {} workflow(s)", document.workflows.len());
        Ok(true)
    }

    pub fn user_repo_path(&self, user: &str) -> VcResult<PathBuf> {
        validate_user_id(user)?;
        Ok(self.repo_base_path.join(user))
    }

    /// Opens the user's clone, cloning from central first when it is missing or broken.
    pub fn open(&self, user: &str) -> VcResult<GitRepository> {
        let path = self.user_repo_path(user)?;

        match Repository::open(&path) {
            Ok(repo) => {
                self.repair_origin(&repo)?;
                Ok(GitRepository::new(repo, self.author.clone()))
            }
            Err(_) => {
                if path.exists() {
                    warn!("Removing unusable clone at {}", path.display());
                    fs::remove_dir_all(&path)?;
                }
                fs::create_dir_all(&self.repo_base_path)?;

                let repo = Repository::clone(&self.central_url(), &path)?;
                info!("Cloned central repository for user {} into {}", user, path.display());
                Ok(GitRepository::new(repo, self.author.clone()))
            }
        }
    }

    fn repair_origin(&self, repo: &Repository) -> VcResult<()> {
        let url = self.central_url();
        let current = match repo.find_remote(REMOTE_NAME) {
            Ok(remote) => remote.url().map(str::to_string),
            Err(_) => {
                repo.remote(REMOTE_NAME, &url)?;
                info!("Added missing {} remote", REMOTE_NAME);
                return Ok(());
            }
        };

        if current.as_deref() != Some(url.as_str()) {
            repo.remote_set_url(REMOTE_NAME, &url)?;
            info!("Repointed {} from {:?} to {}", REMOTE_NAME, current, url);
        }
        Ok(())
    }
}

/// A user id must be usable as a single directory name.
pub fn validate_user_id(user: &str) -> VcResult<()> {
    let valid = !user.is_empty()
        && user != "."
        && user != ".."
        && user
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
    if valid {
        Ok(())
    } else {
        Err(VcError::InvalidUser(user.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::GitProvider;
    use crate::models::Workflow;
    use tempfile::TempDir;

    fn registry(root: &Path) -> RepositoryRegistry {
        RepositoryRegistry::new(&AppConfig::rooted_at(root))
    }

    fn sample() -> ProgramWorkflows {
        ProgramWorkflows::new(vec![Workflow {
            workflow_key: "onboarding".to_string(),
            workflow_name: "Onboarding".to_string(),
            ..Default::default()
        }])
    }

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id("alice").is_ok());
        assert!(validate_user_id("bob.smith@corp").is_ok());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("..").is_err());
        assert!(validate_user_id("a/b").is_err());
        assert!(validate_user_id("a b").is_err());
    }

    #[test]
    fn test_seed_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let registry = registry(temp_dir.path());

        assert!(registry.seed_central(&sample()).unwrap());
        assert!(!registry.seed_central(&sample()).unwrap());
    }

    #[test]
    fn test_open_clones_then_reuses() {
        let temp_dir = TempDir::new().unwrap();
        let registry = registry(temp_dir.path());
        registry.seed_central(&sample()).unwrap();

        let first = registry.open("alice").unwrap();
        let head = first.head_commit().unwrap();
        assert!(head.is_some());
        assert_eq!(first.current_branch_name().unwrap().as_deref(), Some("main"));
        drop(first);

        let second = registry.open("alice").unwrap();
        assert_eq!(second.head_commit().unwrap(), head);
    }

    #[test]
    fn test_open_replaces_broken_clone() {
        let temp_dir = TempDir::new().unwrap();
        let registry = registry(temp_dir.path());
        registry.seed_central(&sample()).unwrap();

        let path = registry.user_repo_path("carol").unwrap();
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("junk.txt"), "partial").unwrap();

        let repo = registry.open("carol").unwrap();
        assert!(repo.head_commit().unwrap().is_some());
        assert!(!path.join("junk.txt").exists());
    }

    #[test]
    fn test_open_repairs_drifted_origin() {
        let temp_dir = TempDir::new().unwrap();
        let registry = registry(temp_dir.path());
        registry.seed_central(&sample()).unwrap();
        drop(registry.open("dave").unwrap());

        let path = registry.user_repo_path("dave").unwrap();
        Repository::open(&path)
            .unwrap()
            .remote_set_url(REMOTE_NAME, "/somewhere/else")
            .unwrap();

        let repo = registry.open("dave").unwrap();
        let remote = repo.inner().find_remote(REMOTE_NAME).unwrap();
        assert_eq!(remote.url(), Some(registry.central_url().as_str()));
    }
}
