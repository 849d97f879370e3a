//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::{EntityId, PartKey};

/// Represents a TPS project: a directory tree of part, baseline and
/// configuration YAML files under a `.tps/` marker directory
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .tps/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(".tps").is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(".tps").exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::create_structure(root)
    }

    /// Force initialization even if .tps/ exists
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create_structure(root)
    }

    fn create_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let tps_dir = root.join(".tps");
        std::fs::create_dir_all(&tps_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;

        std::fs::write(tps_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        for dir in ["parts", "baselines", "configurations"] {
            std::fs::create_dir_all(root.join(dir))
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# TPS Project Configuration

# Principal used by the work-in-progress policy (default: $USER)
# principal: ""

# Workspace used when a part number is given without one
# workspace: default

# Default configuration policy (wip, effectivity, baseline)
# default_policy: wip

# Maximum depth to expand (omit for unbounded)
# stop_depth: 10

# Default output format (tree, yaml, json, tsv)
# default_format: tree
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .tps configuration directory
    pub fn tps_dir(&self) -> PathBuf {
        self.root.join(".tps")
    }

    pub fn parts_dir(&self) -> PathBuf {
        self.root.join("parts")
    }

    pub fn baselines_dir(&self) -> PathBuf {
        self.root.join("baselines")
    }

    pub fn configurations_dir(&self) -> PathBuf {
        self.root.join("configurations")
    }

    /// File a part master is stored in: `parts/<workspace>/<number>.tps.yaml`
    pub fn part_path(&self, key: &PartKey) -> PathBuf {
        self.parts_dir()
            .join(key.workspace())
            .join(format!("{}.tps.yaml", key.number()))
    }

    /// File a baseline is stored in: `baselines/BSL-<ulid>.tps.yaml`
    pub fn baseline_path(&self, id: &EntityId) -> PathBuf {
        self.baselines_dir().join(format!("{}.tps.yaml", id))
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a TPS project (searched from {searched_from:?}). Run 'tps init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("TPS project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
