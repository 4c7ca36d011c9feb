//! Property tests for the progression engine

use std::collections::{HashMap, HashSet, VecDeque};

use proptest::prelude::*;
use questline::domain::{
    compute_levels, derive_objective_keys, find_path, objective_signature, Adjacency, Edge,
    ItemRef, Node, ObjectiveKey, StepData,
};
use questline::{DependencyGraph, Objective, Task, TaskId};

fn task_id(i: usize) -> TaskId {
    TaskId::new(format!("t-{}", i))
}

/// Each task may only depend on tasks listed before it
fn acyclic_adjacency(prereqs: &[Vec<usize>]) -> Adjacency {
    prereqs
        .iter()
        .enumerate()
        .map(|(i, ps)| {
            let ps: Vec<TaskId> = if i == 0 {
                Vec::new()
            } else {
                ps.iter().map(|p| task_id(p % i)).collect()
            };
            (task_id(i), ps)
        })
        .collect()
}

fn node_id(i: usize) -> String {
    if i == 0 {
        "start".to_string()
    } else {
        format!("n{}", i)
    }
}

/// Forward BFS distance from the root, for checking the reverse search
fn distance_from_root(edges: &[(usize, usize)], target: usize) -> Option<usize> {
    let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
    for &(s, t) in edges {
        outgoing.entry(s).or_default().push(t);
    }

    let mut dist: HashMap<usize, usize> = HashMap::from([(0, 0)]);
    let mut queue = VecDeque::from([0]);
    while let Some(current) = queue.pop_front() {
        for &next in outgoing.get(&current).into_iter().flatten() {
            if !dist.contains_key(&next) {
                dist.insert(next, dist[&current] + 1);
                queue.push_back(next);
            }
        }
    }

    dist.get(&target).copied()
}

proptest! {
    #[test]
    fn prop_prerequisite_raises_level(
        prereqs in prop::collection::vec(prop::collection::vec(0..40usize, 0..4), 1..40)
    ) {
        let adjacency = acyclic_adjacency(&prereqs);
        let levels = compute_levels(&adjacency);

        prop_assert_eq!(levels.len(), adjacency.len());
        for (task, ps) in &adjacency {
            if ps.is_empty() {
                prop_assert_eq!(levels[task], 0);
            }
            for p in ps {
                prop_assert!(levels[task] >= levels[p] + 1);
            }
        }
    }

    #[test]
    fn prop_cyclic_levels_are_bounded(
        task_count in 1..25usize,
        edges in prop::collection::vec((0..25usize, 0..25usize), 0..60)
    ) {
        let mut adjacency: Adjacency = (0..task_count).map(|i| (task_id(i), Vec::new())).collect();
        for (task, prereq) in edges {
            if let Some(ps) = adjacency.get_mut(&task_id(task % task_count)) {
                ps.push(task_id(prereq % task_count));
            }
        }

        let levels = compute_levels(&adjacency);

        prop_assert_eq!(levels.len(), task_count);
        prop_assert!(levels.values().all(|&l| (l as usize) <= task_count));
    }

    #[test]
    fn prop_available_means_no_known_prerequisite_pending(
        prereqs in prop::collection::vec(prop::collection::vec(0..30usize, 0..3), 1..30),
        done in prop::collection::vec(any::<bool>(), 30)
    ) {
        let graph = DependencyGraph::from_adjacency(acyclic_adjacency(&prereqs));
        let completed: HashSet<TaskId> = (0..prereqs.len())
            .filter(|&i| done[i])
            .map(task_id)
            .collect();

        let available: HashSet<TaskId> = graph.available_tasks(&completed).into_iter().collect();
        let blocked: HashSet<TaskId> = graph
            .blocked_tasks(&completed)
            .into_iter()
            .map(|b| b.id)
            .collect();

        for id in graph.task_ids() {
            if completed.contains(id) {
                prop_assert!(!available.contains(id) && !blocked.contains(id));
            } else {
                prop_assert!(available.contains(id) != blocked.contains(id));
            }
        }
    }

    #[test]
    fn prop_signature_ignores_list_order(
        maps in prop::collection::vec("[A-Za-z ]{1,12}", 0..5),
        items in prop::collection::vec(("[a-z0-9]{1,8}", "[A-Za-z ]{0,10}"), 0..5),
        rotate in 0..5usize
    ) {
        let items: Vec<ItemRef> = items.into_iter().map(|(id, name)| ItemRef::new(id, name)).collect();
        let original = Objective::new("Find the stash")
            .with_maps(maps.clone())
            .with_items(items.clone());

        let mut reordered_maps = maps;
        reordered_maps.reverse();
        let mut reordered_items = items;
        if !reordered_items.is_empty() {
            let by = rotate % reordered_items.len();
            reordered_items.rotate_left(by);
        }
        let reordered = Objective::new("Find the stash")
            .with_maps(reordered_maps)
            .with_items(reordered_items);

        prop_assert_eq!(objective_signature(&original), objective_signature(&reordered));
    }

    #[test]
    fn prop_identical_objectives_get_occurrence_suffixes(
        description in "[A-Za-z0-9 :/%-]{0,24}",
        copies in 1..6usize
    ) {
        let mut task = Task::new(TaskId::new("task"));
        for _ in 0..copies {
            task = task.with_objective(Objective::new(description.clone()).with_count(2));
        }

        let keys = derive_objective_keys(&task);
        let distinct: HashSet<&String> = keys.iter().collect();
        prop_assert_eq!(distinct.len(), copies);

        for (i, key) in keys.iter().enumerate() {
            let parsed: ObjectiveKey = key.parse().unwrap();
            prop_assert_eq!(parsed.occurrence as usize, i + 1);
            prop_assert_eq!(parsed.task_id.as_str(), "task");
            let suffix = format!("::{}", i + 1);
            prop_assert!(key.ends_with(&suffix));
        }
    }

    #[test]
    fn prop_find_path_is_a_shortest_route(
        node_count in 1..15usize,
        raw_edges in prop::collection::vec((0..15usize, 0..15usize), 0..40),
        target in 0..15usize
    ) {
        let target = target % node_count;
        let target_id = node_id(target);
        let edges: Vec<(usize, usize)> = raw_edges
            .into_iter()
            .map(|(s, t)| (s % node_count, t % node_count))
            .collect();

        let nodes: Vec<Node> = (0..node_count)
            .map(|i| Node::story(&node_id(i), StepData::default()))
            .collect();
        let storyline_edges: Vec<Edge> = edges
            .iter()
            .map(|&(s, t)| Edge::new(&node_id(s), &node_id(t)))
            .collect();

        let path = find_path(&target_id, &nodes, &storyline_edges);
        let ids: Vec<&str> = path.iter().map(|n| n.id().as_str()).collect();

        prop_assert_eq!(ids.first().copied(), Some("start"));

        match distance_from_root(&edges, target) {
            Some(dist) => {
                prop_assert_eq!(ids.len(), dist + 1);
                prop_assert_eq!(ids.last().copied(), Some(target_id.as_str()));
                for pair in ids.windows(2) {
                    prop_assert!(storyline_edges
                        .iter()
                        .any(|e| e.source.as_str() == pair[0] && e.target.as_str() == pair[1]));
                }
            }
            None => {
                prop_assert_eq!(ids.len(), 1);
            }
        }
    }
}
