//! # Storage Layer
//!
//! Read-only access to the data the engine is run against. Nothing here
//! writes progress: the snapshot is owned by whatever persists a profile.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Task catalog | JSON array or JSONL | `.questline/tasks.json` |
//! | Overlay patches | JSON arrays of partial tasks | `.questline/overlays/*.json` |
//! | Progress snapshot | JSON | `.questline/progress.json` |
//! | Storyline | YAML or JSON | `.questline/storyline.yaml` |
//! | Config | TOML | `.questline/config.toml` |
//!
//! File locations inside `.questline/` are configurable (see [`Config`]).
//!
//! ## Concurrency Safety
//!
//! Files are read under a shared `fs2` lock, so a writer holding an
//! exclusive lock is never observed half-way through a write.
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a Questline project
//! - [`CatalogStore`] - Task catalog with overlays applied
//! - [`ProgressStore`] - Progress snapshot
//! - [`StorylineStore`] - Validated storyline
//! - [`Config`] - Project and global configuration

mod catalog;
mod config;
mod progress;
mod project;
mod storyline;

pub use catalog::{apply_overlay, CatalogError, CatalogStore, TaskPatch};
pub use config::{Config, ConfigError, DataConfig, GlobalConfig, OutputFormat, ProjectConfig, StorylineConfig, PROJECT_DIR};
pub use progress::ProgressStore;
pub use project::{Project, ProjectError};
pub use storyline::{StorylineDocument, StorylineStore};

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use fs2::FileExt;

/// Reads a whole file while holding a shared lock on it
pub(crate) fn read_locked(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    FileExt::lock_shared(&file)
        .with_context(|| format!("Failed to acquire read lock on {}", path.display()))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    // Lock is released when file is dropped
    Ok(content)
}
