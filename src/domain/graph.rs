//! Dependency graph for tasks
//!
//! Builds the prerequisite adjacency mapping from a task collection and
//! derives the read-only views over it: per-task levels (tiers), the
//! availability predicate and the ready/blocked queues.
//!
//! The mapping is taken as given. Dangling references are legal and count
//! as "no such dependency". Cycles are tolerated, never rejected: levels on
//! a cycle are under-counted but always terminate, and petgraph is used only
//! to report cycles for diagnostics.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use super::id::TaskId;
use super::task::Task;

/// Task ID → ordered prerequisite IDs, verbatim from the catalog
pub type Adjacency = HashMap<TaskId, Vec<TaskId>>;

/// Computes the level of every task in the mapping
///
/// `level = 0` without prerequisites, otherwise `1 + max(level(p))`.
/// A prerequisite with no entry in the mapping counts as level 0.
///
/// On cyclic input, revisiting a task that is still being resolved yields
/// the level recorded for it so far (0), which breaks the cycle. Levels
/// along a cycle are therefore under-counted; they are never infinite.
/// Tasks are resolved in sorted ID order, so the under-count is the same
/// on every run.
pub fn compute_levels(adjacency: &Adjacency) -> HashMap<TaskId, u32> {
    let mut ids: Vec<&TaskId> = adjacency.keys().collect();
    ids.sort();
    levels_in_order(ids, adjacency)
}

/// Resolves levels starting from each ID of `order` in turn
fn levels_in_order<'a>(
    order: impl IntoIterator<Item = &'a TaskId>,
    adjacency: &'a Adjacency,
) -> HashMap<TaskId, u32> {
    let mut state = LevelState::default();

    for id in order {
        state.resolve(id.as_str(), adjacency);
    }

    adjacency
        .keys()
        .map(|id| (id.clone(), state.levels.get(id.as_str()).copied().unwrap_or(0)))
        .collect()
}

#[derive(Default)]
struct LevelState<'a> {
    levels: HashMap<&'a str, u32>,
    resolved: HashSet<&'a str>,
    in_progress: HashSet<&'a str>,
}

/// A task whose prerequisites are being walked
struct Frame<'a> {
    id: &'a str,
    prerequisites: &'a [TaskId],
    next: usize,
    max: Option<u32>,
}

impl<'a> LevelState<'a> {
    /// Resolves `root` and everything it depends on, depth-first on an
    /// explicit stack
    fn resolve(&mut self, root: &'a str, adjacency: &'a Adjacency) {
        let mut stack = match adjacency.get(root) {
            Some(prerequisites) if self.settled(root, adjacency).is_none() => {
                vec![self.enter(root, prerequisites)]
            }
            _ => return,
        };

        while let Some(frame) = stack.last_mut() {
            let prerequisites = frame.prerequisites;

            if let Some(p) = prerequisites.get(frame.next) {
                frame.next += 1;
                let p = p.as_str();

                match (self.settled(p, adjacency), adjacency.get(p)) {
                    (Some(level), _) => frame.max = frame.max.max(Some(level)),
                    (None, Some(next)) => {
                        let child = self.enter(p, next);
                        stack.push(child);
                    }
                    (None, None) => frame.max = frame.max.max(Some(0)),
                }
                continue;
            }

            let level = frame.max.map_or(0, |max| max + 1);
            let id = frame.id;
            stack.pop();

            self.in_progress.remove(id);
            self.resolved.insert(id);
            self.levels.insert(id, level);

            if let Some(parent) = stack.last_mut() {
                parent.max = parent.max.max(Some(level));
            }
        }
    }

    /// Level of a task that needs no further walking, if any
    fn settled(&self, id: &str, adjacency: &Adjacency) -> Option<u32> {
        if self.resolved.contains(id) {
            return Some(self.levels.get(id).copied().unwrap_or(0));
        }

        if self.in_progress.contains(id) {
            debug!(task = id, "prerequisite cycle, using partial level");
            return Some(self.levels.get(id).copied().unwrap_or(0));
        }

        if !adjacency.contains_key(id) {
            return Some(0);
        }

        None
    }

    fn enter(&mut self, id: &'a str, prerequisites: &'a [TaskId]) -> Frame<'a> {
        self.in_progress.insert(id);
        self.levels.insert(id, 0);
        Frame {
            id,
            prerequisites,
            next: 0,
            max: None,
        }
    }
}

/// Returns true if every known prerequisite of `task_id` is completed
///
/// Tasks with no prerequisites, and IDs absent from the mapping, are always
/// available. Prerequisite IDs that have no entry in the mapping are
/// skipped. `completed` is only read.
pub fn is_available(task_id: &str, completed: &HashSet<TaskId>, adjacency: &Adjacency) -> bool {
    match adjacency.get(task_id) {
        Some(prerequisites) => prerequisites
            .iter()
            .all(|p| completed.contains(p) || !adjacency.contains_key(p)),
        None => true,
    }
}

/// A task waiting on prerequisites
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedTask {
    pub id: TaskId,
    /// Known prerequisites that are not yet completed, in prerequisite order
    pub waiting_on: Vec<TaskId>,
}

/// A dependency graph for tasks
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Task IDs in first-seen catalog order
    order: Vec<TaskId>,

    /// Task → prerequisites
    adjacency: Adjacency,
}

impl DependencyGraph {
    /// Creates an empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from an ordered task collection
    ///
    /// A task ID seen twice keeps its first position; the later entry's
    /// prerequisites replace the earlier ones.
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut graph = Self::new();
        for task in tasks {
            graph.insert(task.id.clone(), task.prerequisites.as_slice().to_vec());
        }
        graph
    }

    /// Builds the graph from an existing adjacency mapping
    ///
    /// The mapping has no order of its own, so tasks are ordered by ID.
    pub fn from_adjacency(adjacency: Adjacency) -> Self {
        let mut order: Vec<TaskId> = adjacency.keys().cloned().collect();
        order.sort();
        Self { order, adjacency }
    }

    /// Inserts or replaces a task's prerequisites
    pub fn insert(&mut self, task_id: TaskId, prerequisites: Vec<TaskId>) {
        if !self.adjacency.contains_key(&task_id) {
            self.order.push(task_id.clone());
        }
        self.adjacency.insert(task_id, prerequisites);
    }

    /// Returns the adjacency mapping
    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Returns the direct prerequisites of a task, verbatim
    pub fn prerequisites(&self, task_id: &str) -> &[TaskId] {
        self.adjacency
            .get(task_id)
            .map(|p| p.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the tasks that list `task_id` as a prerequisite
    pub fn dependents(&self, task_id: &str) -> Vec<TaskId> {
        self.order
            .iter()
            .filter(|id| self.prerequisites(id.as_str()).iter().any(|p| p.as_str() == task_id))
            .cloned()
            .collect()
    }

    /// Returns the level of every task, resolving in catalog order
    pub fn levels(&self) -> HashMap<TaskId, u32> {
        levels_in_order(&self.order, &self.adjacency)
    }

    /// Groups tasks by level, ascending, catalog order within a tier
    pub fn tiers(&self) -> BTreeMap<u32, Vec<TaskId>> {
        let levels = self.levels();
        let mut tiers: BTreeMap<u32, Vec<TaskId>> = BTreeMap::new();

        for id in &self.order {
            let level = levels.get(id).copied().unwrap_or(0);
            tiers.entry(level).or_default().push(id.clone());
        }

        tiers
    }

    /// All tasks ordered by tier
    pub fn progression_order(&self) -> Vec<TaskId> {
        self.tiers().into_values().flatten().collect()
    }

    /// Returns true if the task's known prerequisites are all completed
    pub fn is_available(&self, task_id: &str, completed: &HashSet<TaskId>) -> bool {
        is_available(task_id, completed, &self.adjacency)
    }

    /// Returns tasks that are available and not yet completed
    pub fn available_tasks(&self, completed: &HashSet<TaskId>) -> Vec<TaskId> {
        self.order
            .iter()
            .filter(|id| !completed.contains(*id))
            .filter(|id| self.is_available(id.as_str(), completed))
            .cloned()
            .collect()
    }

    /// Returns incomplete tasks with at least one incomplete prerequisite
    pub fn blocked_tasks(&self, completed: &HashSet<TaskId>) -> Vec<BlockedTask> {
        self.order
            .iter()
            .filter(|id| !completed.contains(*id))
            .filter_map(|id| {
                let waiting_on: Vec<TaskId> = self
                    .prerequisites(id.as_str())
                    .iter()
                    .filter(|p| self.contains(p.as_str()) && !completed.contains(*p))
                    .cloned()
                    .collect();

                if waiting_on.is_empty() {
                    None
                } else {
                    Some(BlockedTask {
                        id: id.clone(),
                        waiting_on,
                    })
                }
            })
            .collect()
    }

    /// Returns `(task, prerequisite)` pairs whose prerequisite is unknown
    pub fn dangling_references(&self) -> Vec<(TaskId, TaskId)> {
        self.order
            .iter()
            .flat_map(|id| {
                self.prerequisites(id.as_str())
                    .iter()
                    .filter(|p| !self.contains(p.as_str()))
                    .map(move |p| (id.clone(), p.clone()))
            })
            .collect()
    }

    /// Returns groups of tasks that form prerequisite cycles
    ///
    /// Each group is a strongly connected component with more than one task,
    /// or a single task listing itself. Members are in catalog order.
    pub fn cyclic_groups(&self) -> Vec<Vec<TaskId>> {
        let mut graph: DiGraph<&TaskId, ()> = DiGraph::new();
        let mut node_map: HashMap<&str, NodeIndex> = HashMap::new();

        for id in &self.order {
            let idx = graph.add_node(id);
            node_map.insert(id.as_str(), idx);
        }

        // Edge direction: prerequisite -> task
        for id in &self.order {
            let task_idx = node_map[id.as_str()];
            for p in self.prerequisites(id.as_str()) {
                if let Some(&dep_idx) = node_map.get(p.as_str()) {
                    graph.add_edge(dep_idx, task_idx, ());
                }
            }
        }

        let position: HashMap<&str, usize> = self
            .order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut groups: Vec<Vec<TaskId>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || graph.find_edge(scc[0], scc[0]).is_some()
            })
            .map(|scc| {
                let mut members: Vec<TaskId> =
                    scc.into_iter().map(|idx| graph[idx].clone()).collect();
                members.sort_by_key(|id| position[id.as_str()]);
                members
            })
            .collect();

        groups.sort_by_key(|g| position[g[0].as_str()]);
        groups
    }

    /// Returns true if the graph contains the task
    pub fn contains(&self, task_id: &str) -> bool {
        self.adjacency.contains_key(task_id)
    }

    /// Returns the number of tasks in the graph
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns all task IDs in catalog order
    pub fn task_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.order.iter()
    }
}
