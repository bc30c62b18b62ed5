// ABOUTME: Application configuration loaded from TOML
// Storage locations for the central repository, user clones, and pull request records

use crate::git::repository::Author;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot find config directory")]
    NoConfigDir,

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Parent directory of the per-user clones
    pub repo_base_path: PathBuf,

    /// Shared bare repository every user clone pushes to
    pub central_repo_path: PathBuf,

    /// Directory holding `pull_requests.json`
    pub pull_requests_path: PathBuf,

    pub default_branch: String,

    pub author_name: String,
    pub author_email: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            repo_base_path: PathBuf::from("repos"),
            central_repo_path: PathBuf::from("central-repo"),
            pull_requests_path: PathBuf::from("pull-requests"),
            default_branch: "main".to_string(),
            author_name: "System".to_string(),
            author_email: "system@workflow.com".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads from `path`, or the default location. A missing file yields defaults.
    /// Relative paths are anchored at the directory holding the file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            let root = std::env::current_dir().map_err(|source| ConfigError::Read {
                path: config_path.clone(),
                source,
            })?;
            return Ok(Self::default().resolved_against(&root));
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.clone(),
            source,
        })?;

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config.resolved_against(&root))
    }

    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("workflow-config").join("config.toml"))
    }

    /// Anchors every relative storage path at `root`.
    pub fn resolved_against(mut self, root: &Path) -> Self {
        for path in [
            &mut self.repo_base_path,
            &mut self.central_repo_path,
            &mut self.pull_requests_path,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
        self
    }

    /// All storage under one directory.
    pub fn rooted_at(root: &Path) -> Self {
        Self::default().resolved_against(root)
    }

    pub fn author(&self) -> Author {
        Author::new(&self.author_name, &self.author_email)
    }
}
