//! Configuration handling for Questline
//!
//! Configuration is stored in `.questline/config.toml` (project) and
//! `~/.config/questline/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ROOT_NODE_ID;

/// Name of the project directory
pub const PROJECT_DIR: &str = ".questline";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Where the project's data files live, relative to `.questline/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    /// Task catalog (JSON array, or JSONL with a `.jsonl` extension)
    pub catalog: PathBuf,

    /// Directory of overlay patches, applied in file-name order
    pub overlays: PathBuf,

    /// Progress snapshot
    pub progress: PathBuf,

    /// Storyline nodes and edges (YAML, or JSON with a `.json` extension)
    pub storyline: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("tasks.json"),
            overlays: PathBuf::from("overlays"),
            progress: PathBuf::from("progress.json"),
            storyline: PathBuf::from("storyline.yaml"),
        }
    }
}

/// Storyline settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorylineConfig {
    /// ID of the storyline's entry node
    pub root: String,
}

impl Default for StorylineConfig {
    fn default() -> Self {
        Self {
            root: ROOT_NODE_ID.to_string(),
        }
    }
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ProjectConfig {
    pub data: DataConfig,
    pub storyline: StorylineConfig,
}

impl ProjectConfig {
    /// Rejects settings the loaders cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storyline.root.trim().is_empty() {
            return Err(ConfigError::Invalid("storyline.root must not be empty".into()));
        }

        for (name, path) in [
            ("data.catalog", &self.data.catalog),
            ("data.progress", &self.data.progress),
            ("data.storyline", &self.data.storyline),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", name)));
            }
        }

        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
}

impl Config {
    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self { project, global })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "questline", "questline")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(PROJECT_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;

        config
            .validate()
            .with_context(|| format!("Invalid project config: {}", config_path.display()))?;

        Ok(config)
    }

    /// Finds the project root by looking for `.questline/` upwards
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Finds the project root starting at `start`
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}
