//! Task catalog and overlay patches
//!
//! The catalog is a JSON array of tasks, or JSONL (one task per line) when
//! the file has a `.jsonl` extension. Overlay patches are JSON arrays of
//! partial tasks whose present fields replace the catalog's; overlays for
//! unknown task IDs add new tasks. Overlays apply in file-name order.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::read_locked;
use crate::domain::{Objective, Prerequisites, Task, TaskId};

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("Duplicate task ID in catalog: {0}")]
    DuplicateTask(TaskId),

    #[error("Task not found: {0}")]
    TaskNotFound(String),
}

/// Partial task from an overlay file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub id: TaskId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, alias = "trader", skip_serializing_if = "Option::is_none")]
    pub giver: Option<String>,

    #[serde(default, alias = "taskRequirements", skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<Prerequisites>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectives: Option<Vec<Objective>>,
}

impl TaskPatch {
    /// Creates a patch that changes nothing
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            name: None,
            giver: None,
            prerequisites: None,
            objectives: None,
        }
    }

    /// Applies the patch's present fields to a task
    pub fn apply_to(self, task: &mut Task) {
        if let Some(name) = self.name {
            task.name = Some(name);
        }
        if let Some(giver) = self.giver {
            task.giver = Some(giver);
        }
        if let Some(prerequisites) = self.prerequisites {
            task.prerequisites = prerequisites;
        }
        if let Some(objectives) = self.objectives {
            task.objectives = objectives;
        }
    }

    /// Builds a new task from the patch
    fn into_task(self) -> Task {
        let mut task = Task::new(self.id.clone());
        self.apply_to(&mut task);
        task
    }
}

/// Applies overlay patches to a catalog, in order
///
/// Returns the number of tasks added by the patches.
pub fn apply_overlay(tasks: &mut Vec<Task>, patches: Vec<TaskPatch>) -> usize {
    let mut index: HashMap<TaskId, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.clone(), i))
        .collect();
    let mut added = 0;

    for patch in patches {
        let existing = index.get(&patch.id).copied();
        match existing {
            Some(i) => patch.apply_to(&mut tasks[i]),
            None => {
                index.insert(patch.id.clone(), tasks.len());
                tasks.push(patch.into_task());
                added += 1;
            }
        }
    }

    added
}

/// Reads the task catalog and its overlays
pub struct CatalogStore {
    path: PathBuf,
    overlays_dir: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>, overlays_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            overlays_dir: overlays_dir.into(),
        }
    }

    /// Returns the path to the catalog file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the catalog with all overlays applied
    pub fn read_all(&self) -> Result<Vec<Task>> {
        let mut tasks = self.read_base()?;

        for overlay in self.overlay_files()? {
            let patches = Self::read_overlay(&overlay)?;
            apply_overlay(&mut tasks, patches);
        }

        Ok(tasks)
    }

    /// Reads one task by ID
    pub fn get(&self, task_id: &str) -> Result<Task> {
        self.read_all()?
            .into_iter()
            .find(|t| t.id.as_str() == task_id)
            .ok_or_else(|| CatalogError::TaskNotFound(task_id.to_string()).into())
    }

    /// Reads the catalog without overlays
    ///
    /// A missing catalog file is an empty catalog.
    pub fn read_base(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = read_locked(&self.path)?;

        let tasks: Vec<Task> = if self.path.extension().is_some_and(|ext| ext == "jsonl") {
            let mut tasks = Vec::new();
            for (line_num, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let task: Task = serde_json::from_str(line)
                    .with_context(|| format!("Failed to parse task at line {}", line_num + 1))?;
                tasks.push(task);
            }
            tasks
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse catalog: {}", self.path.display()))?
        };

        let mut seen = std::collections::HashSet::new();
        for task in &tasks {
            if !seen.insert(&task.id) {
                return Err(CatalogError::DuplicateTask(task.id.clone()).into());
            }
        }

        Ok(tasks)
    }

    /// Lists overlay files (`*.json`) sorted by file name
    pub fn overlay_files(&self) -> Result<Vec<PathBuf>> {
        if !self.overlays_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files: Vec<PathBuf> = fs::read_dir(&self.overlays_dir)
            .with_context(|| {
                format!("Failed to read overlays: {}", self.overlays_dir.display())
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();

        files.sort();
        Ok(files)
    }

    fn read_overlay(path: &Path) -> Result<Vec<TaskPatch>> {
        let content = read_locked(path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse overlay: {}", path.display()))
    }
}
