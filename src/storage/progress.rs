//! Progress snapshot file
//!
//! The snapshot is written by whatever persists a profile's progress; this
//! store only reads it. Item-progress values are kept raw and validated on
//! lookup, so one malformed entry never prevents loading the rest.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::read_locked;
use crate::domain::ProgressSnapshot;

/// Reads the progress snapshot
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the snapshot; a missing file is empty progress
    pub fn read(&self) -> Result<ProgressSnapshot> {
        if !self.path.exists() {
            return Ok(ProgressSnapshot::default());
        }

        let content = read_locked(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ProgressSnapshot::default());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse progress snapshot: {}", self.path.display()))
    }
}
