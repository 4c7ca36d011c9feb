//! Project management
//!
//! Handles project initialization and provides access to stores.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::PROJECT_DIR;
use super::{CatalogStore, Config, ProgressStore, StorylineStore};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a questline project. Run 'questline init' first.")]
    NotInProject,

    #[error("No storyline found at {0}")]
    NoStoryline(PathBuf),
}

/// A Questline project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Opens the given project, or discovers one from the current directory
    pub fn open_or_discover(root: Option<&Path>) -> Result<Self> {
        match root {
            Some(root) => Self::open(root),
            None => Self::open_current(),
        }
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let data_dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&data_dir).with_context(|| {
            format!("Failed to create {} directory: {}", PROJECT_DIR, data_dir.display())
        })?;

        let overlays_dir = data_dir.join("overlays");
        fs::create_dir_all(&overlays_dir).with_context(|| {
            format!("Failed to create overlays directory: {}", overlays_dir.display())
        })?;

        let config_path = data_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# Questline configuration

[data]
# Task catalog (JSON array, or JSONL with a .jsonl extension)
catalog = "tasks.json"
# Overlay patches applied on top of the catalog, in file-name order
overlays = "overlays"
# Progress snapshot
progress = "progress.json"
# Storyline nodes and edges (YAML, or JSON with a .json extension)
storyline = "storyline.yaml"

[storyline]
# Entry node of the storyline
root = "start"
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let catalog_path = data_dir.join("tasks.json");
        if !catalog_path.exists() {
            fs::write(&catalog_path, "[]\n")
                .with_context(|| format!("Failed to write catalog: {}", catalog_path.display()))?;
        }

        // Progress belongs to a profile, not to the shared project data
        let gitignore_path = data_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, "progress.json\n").with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the `.questline` directory
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.data_dir().join(path)
    }

    /// Returns the task catalog store
    pub fn catalog_store(&self) -> CatalogStore {
        let data = &self.config.project.data;
        CatalogStore::new(self.resolve(&data.catalog), self.resolve(&data.overlays))
    }

    /// Returns the progress snapshot store
    pub fn progress_store(&self) -> ProgressStore {
        ProgressStore::new(self.resolve(&self.config.project.data.progress))
    }

    /// Returns the storyline store
    pub fn storyline_store(&self) -> StorylineStore {
        StorylineStore::new(self.resolve(&self.config.project.data.storyline))
    }

    /// Reads and validates the storyline, failing if there is none
    pub fn storyline(&self) -> Result<crate::domain::Storyline> {
        let store = self.storyline_store();
        if !store.exists() {
            return Err(ProjectError::NoStoryline(store.path().to_path_buf()).into());
        }
        store.read(&self.config.project.storyline.root)
    }
}
