//! Domain models for Questline
//!
//! Contains the progression engine without any I/O concerns: the task
//! dependency graph, objective keys, progress lookups and the storyline
//! path resolver. Everything here is a pure function of its inputs.

mod id;
mod task;
mod graph;
mod keys;
mod progress;
mod storyline;

pub use id::{IdError, NodeId, TaskId};
pub use task::{ItemRef, Objective, Prerequisites, Task};
pub use graph::{compute_levels, is_available, Adjacency, BlockedTask, DependencyGraph};
pub use keys::{
    derive_item_progress_key, derive_objective_keys, escape, legacy_item_key, legacy_key,
    normalize, objective_signature, unescape, KeyError, ObjectiveKey, ObjectiveKeyCache,
};
pub use progress::{
    item_progress, objective_completed, parse_progress_value, ItemProgress, ObjectiveProgress,
    ProgressSnapshot,
};
pub use storyline::{
    classify_node, find_path, find_path_from, path_edge_ids, summarize_path, CostBucket, Edge,
    EndingData, Node, NodeClassification, PathSummary, ResolvedPath, StepData, Storyline,
    StorylineError, TimeCost, ALT_CURRENCY_THRESHOLD, CRAFT_KEYWORD, ROOT_NODE_ID,
};
