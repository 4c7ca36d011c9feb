//! Progress snapshot and key-compatible lookups
//!
//! The snapshot is whatever the persistence layer last stored for a
//! profile. It is read-only here. Lookups accept both stable objective keys
//! and the positional legacy keys older snapshots were written with, so no
//! migration step is needed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::warn;

use super::id::TaskId;
use super::keys::{derive_item_progress_key, legacy_item_key, legacy_key};
use super::task::Task;

/// Persisted completion and item-progress state for one profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Completed task IDs
    #[serde(default)]
    pub completed_tasks: HashSet<TaskId>,

    /// Completed objectives, under stable or legacy keys
    #[serde(default)]
    pub completed_objectives: HashSet<String>,

    /// Item progress counts, under stable or legacy item keys
    ///
    /// Values are kept raw; see [`parse_progress_value`].
    #[serde(default)]
    pub item_progress: HashMap<String, Value>,
}

/// Reads a persisted progress count
///
/// Accepts non-negative integers, integral floats and numeric strings.
/// Anything else is treated as absent and logged, never trusted.
pub fn parse_progress_value(key: &str, value: &Value) -> Option<u32> {
    let parsed = match value {
        Value::Null => return None,
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match parsed.and_then(|v| u32::try_from(v).ok()) {
        Some(count) => Some(count),
        None => {
            warn!(key, value = %value, "ignoring malformed item progress value");
            None
        }
    }
}

/// True if the objective is completed under either key
pub fn objective_completed(completed: &HashSet<String>, stable_key: &str, legacy_key: &str) -> bool {
    completed.contains(stable_key) || completed.contains(legacy_key)
}

/// Reads an item-progress count, preferring the stable key's value
///
/// Falls back to the legacy key when the stable key is missing or holds a
/// malformed value.
pub fn item_progress(
    progress: &HashMap<String, Value>,
    stable_key: &str,
    legacy_key: &str,
) -> Option<u32> {
    progress
        .get(stable_key)
        .and_then(|v| parse_progress_value(stable_key, v))
        .or_else(|| {
            progress
                .get(legacy_key)
                .and_then(|v| parse_progress_value(legacy_key, v))
        })
}

/// Progress on one required item of an objective
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemProgress {
    pub item_id: String,
    pub name: String,
    pub key: String,
    pub legacy_key: String,
    /// Persisted count, 0 when absent
    pub count: u32,
}

/// Resolved state of one objective
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectiveProgress {
    pub index: usize,
    pub description: String,
    pub key: String,
    pub legacy_key: String,
    pub complete: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemProgress>,
}

impl ProgressSnapshot {
    pub fn is_task_complete(&self, task_id: &str) -> bool {
        self.completed_tasks.contains(task_id)
    }

    pub fn is_objective_complete(&self, stable_key: &str, legacy_key: &str) -> bool {
        objective_completed(&self.completed_objectives, stable_key, legacy_key)
    }

    pub fn item_count(&self, stable_key: &str, legacy_key: &str) -> Option<u32> {
        item_progress(&self.item_progress, stable_key, legacy_key)
    }

    /// Resolves every objective of a task against this snapshot
    ///
    /// `keys` must be the task's objective keys, aligned with its objectives.
    pub fn objective_progress(&self, task: &Task, keys: &[String]) -> Vec<ObjectiveProgress> {
        task.objectives
            .iter()
            .zip(keys)
            .enumerate()
            .map(|(index, (objective, key))| {
                let legacy = legacy_key(task.id.as_str(), index);

                let items = objective
                    .items
                    .iter()
                    .map(|item| {
                        let item_key = derive_item_progress_key(key, &item.id);
                        let legacy_item = legacy_item_key(task.id.as_str(), index, &item.id);
                        let count = self.item_count(&item_key, &legacy_item).unwrap_or(0);

                        ItemProgress {
                            item_id: item.id.clone(),
                            name: item.name.clone(),
                            key: item_key,
                            legacy_key: legacy_item,
                            count,
                        }
                    })
                    .collect();

                ObjectiveProgress {
                    index,
                    description: objective.description.clone(),
                    complete: self.is_objective_complete(key, &legacy),
                    key: key.clone(),
                    legacy_key: legacy,
                    items,
                }
            })
            .collect()
    }
}
