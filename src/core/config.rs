//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

use crate::core::Project;

/// TPS configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Principal checked by the work-in-progress access predicate
    pub principal: Option<String>,

    /// Workspace used for bare part numbers
    pub workspace: Option<String>,

    /// Policy used when none is given on the command line
    pub default_policy: Option<String>,

    /// Default traversal depth limit
    pub stop_depth: Option<usize>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        Self::load_with_project(Project::discover().ok().as_ref())
    }

    /// Load configuration using an already discovered project
    pub fn load_with_project(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/tps/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.tps/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read(&project.tps_dir().join("config.yaml")) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Ok(principal) = std::env::var("TPS_PRINCIPAL") {
            config.principal = Some(principal);
        }
        if let Ok(policy) = std::env::var("TPS_POLICY") {
            config.default_policy = Some(policy);
        }

        config
    }

    fn read(path: &std::path::Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tps")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.principal.is_some() {
            self.principal = other.principal;
        }
        if other.workspace.is_some() {
            self.workspace = other.workspace;
        }
        if other.default_policy.is_some() {
            self.default_policy = other.default_policy;
        }
        if other.stop_depth.is_some() {
            self.stop_depth = other.stop_depth;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Get the principal, falling back to the login name
    pub fn principal(&self) -> String {
        if let Some(ref principal) = self.principal {
            return principal.clone();
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    pub fn workspace(&self) -> String {
        self.workspace
            .clone()
            .unwrap_or_else(|| "default".to_string())
    }
}
