//! Questline - dependency graph and progression engine for quest trackers
//!
//! Questline turns a task catalog with prerequisite references into a
//! leveled dependency graph, decides which tasks are unlocked, derives
//! stable persistence keys for task objectives, and resolves routes through
//! a branching storyline. A small CLI inspects a project's data with it.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{DependencyGraph, Node, NodeId, Objective, Storyline, Task, TaskId};
