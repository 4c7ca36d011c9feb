//! Query commands (status, levels, available, blocked, check)
//!
//! Every command rebuilds the graph from the catalog; nothing is cached
//! between runs.

use std::collections::HashMap;

use anyhow::{bail, Result};

use super::output::Output;
use crate::domain::{
    derive_objective_keys, DependencyGraph, ObjectiveProgress, ProgressSnapshot, Task, TaskId,
};
use crate::storage::Project;

/// Catalog, graph and progress for one command
pub(super) struct Loaded {
    pub tasks: Vec<Task>,
    pub graph: DependencyGraph,
    pub progress: ProgressSnapshot,
}

impl Loaded {
    pub fn read(project: &Project, output: &Output) -> Result<Self> {
        let catalog = project.catalog_store();
        let tasks = catalog.read_all()?;
        output.verbose_ctx(
            "load",
            &format!("Read {} tasks from {}", tasks.len(), catalog.path().display()),
        );

        let progress_store = project.progress_store();
        let progress = progress_store.read()?;
        output.verbose_ctx(
            "load",
            &format!(
                "Read progress from {}: {} tasks, {} objectives complete",
                progress_store.path().display(),
                progress.completed_tasks.len(),
                progress.completed_objectives.len()
            ),
        );

        let graph = DependencyGraph::from_tasks(&tasks);

        Ok(Self {
            tasks,
            graph,
            progress,
        })
    }

    /// Resolves a task's objectives against the progress snapshot
    pub fn objective_progress(&self, task: &Task) -> Vec<ObjectiveProgress> {
        let keys = derive_objective_keys(task);
        self.progress.objective_progress(task, &keys)
    }

    /// Display names by task ID
    pub fn names(&self) -> HashMap<&TaskId, &str> {
        self.tasks.iter().map(|t| (&t.id, t.display_name())).collect()
    }
}

/// Show tasks grouped by dependency level
pub fn levels(project: &Project, output: &Output) -> Result<()> {
    let loaded = Loaded::read(project, output)?;
    let names = loaded.names();
    let tiers = loaded.graph.tiers();

    output.verbose_ctx("levels", &format!("Computed {} tiers", tiers.len()));

    if output.is_json() {
        let items: Vec<_> = tiers
            .iter()
            .map(|(level, ids)| {
                let tasks: Vec<_> = ids
                    .iter()
                    .map(|id| {
                        serde_json::json!({
                            "id": id,
                            "name": names.get(id).copied().unwrap_or(id.as_str()),
                            "completed": loaded.progress.is_task_complete(id.as_str()),
                        })
                    })
                    .collect();
                serde_json::json!({ "level": level, "tasks": tasks })
            })
            .collect();
        output.data(&items);
    } else if tiers.is_empty() {
        println!("No tasks in catalog.");
    } else {
        for (level, ids) in &tiers {
            println!("Level {} ({}):", level, ids.len());
            for id in ids {
                let mark = if loaded.progress.is_task_complete(id.as_str()) { "x" } else { " " };
                let name = names.get(id).copied().unwrap_or(id.as_str());
                println!("  [{}] {:<20} {}", mark, id, name);
            }
        }
    }

    Ok(())
}

/// Show tasks whose prerequisites are all completed
pub fn available(project: &Project, output: &Output) -> Result<()> {
    let loaded = Loaded::read(project, output)?;
    let names = loaded.names();
    let available = loaded.graph.available_tasks(&loaded.progress.completed_tasks);

    output.verbose_ctx("available", &format!("Found {} available tasks", available.len()));

    if output.is_json() {
        let items: Vec<_> = available
            .iter()
            .map(|id| {
                serde_json::json!({
                    "id": id,
                    "name": names.get(id).copied().unwrap_or(id.as_str()),
                })
            })
            .collect();
        output.data(&items);
    } else if available.is_empty() {
        println!("No tasks available.");
    } else {
        println!("Available tasks ({}):", available.len());
        println!("{:<20} NAME", "ID");
        println!("{}", "-".repeat(60));
        for id in &available {
            println!("{:<20} {}", id, names.get(id).copied().unwrap_or(id.as_str()));
        }
    }

    Ok(())
}

/// Show tasks waiting on prerequisites
pub fn blocked(project: &Project, output: &Output) -> Result<()> {
    let loaded = Loaded::read(project, output)?;
    let names = loaded.names();
    let blocked = loaded.graph.blocked_tasks(&loaded.progress.completed_tasks);

    output.verbose_ctx("blocked", &format!("Found {} blocked tasks", blocked.len()));

    if output.is_json() {
        let items: Vec<_> = blocked
            .iter()
            .map(|b| {
                serde_json::json!({
                    "id": b.id,
                    "name": names.get(&b.id).copied().unwrap_or(b.id.as_str()),
                    "waiting_on": b.waiting_on,
                })
            })
            .collect();
        output.data(&items);
    } else if blocked.is_empty() {
        println!("No blocked tasks.");
    } else {
        println!("Blocked tasks ({}):", blocked.len());
        println!("{:<20} {:<30} WAITING ON", "ID", "NAME");
        println!("{}", "-".repeat(80));
        for b in &blocked {
            let waiting: Vec<&str> = b.waiting_on.iter().map(|id| id.as_str()).collect();
            println!(
                "{:<20} {:<30} {}",
                b.id,
                names.get(&b.id).copied().unwrap_or(b.id.as_str()),
                waiting.join(", ")
            );
        }
    }

    Ok(())
}

/// Show progression overview
pub fn status(project: &Project, output: &Output) -> Result<()> {
    let loaded = Loaded::read(project, output)?;
    let completed = &loaded.progress.completed_tasks;

    let total_tasks = loaded.tasks.len();
    let done_tasks = loaded
        .tasks
        .iter()
        .filter(|t| completed.contains(&t.id))
        .count();
    let available_count = loaded.graph.available_tasks(completed).len();
    let blocked_count = loaded.graph.blocked_tasks(completed).len();
    let tier_count = loaded.graph.tiers().len();

    let mut total_objectives = 0;
    let mut done_objectives = 0;
    for task in &loaded.tasks {
        for objective in loaded.objective_progress(task) {
            total_objectives += 1;
            if objective.complete {
                done_objectives += 1;
            }
        }
    }

    let dangling = loaded.graph.dangling_references().len();
    let cycles = loaded.graph.cyclic_groups().len();

    let storyline_store = project.storyline_store();
    let storyline = if storyline_store.exists() {
        Some(project.storyline()?)
    } else {
        output.verbose_ctx("status", "No storyline file");
        None
    };

    if output.is_json() {
        let storyline_summary = storyline.as_ref().map(|s| {
            serde_json::json!({
                "nodes": s.nodes().len(),
                "edges": s.edges().len(),
                "endings": s.endings().len(),
            })
        });
        output.data(&serde_json::json!({
            "tasks": {
                "total": total_tasks,
                "completed": done_tasks,
                "available": available_count,
                "blocked": blocked_count,
                "levels": tier_count,
            },
            "objectives": {
                "total": total_objectives,
                "completed": done_objectives,
            },
            "storyline": storyline_summary,
            "problems": {
                "dangling_references": dangling,
                "cycles": cycles,
            },
        }));
    } else {
        println!("Progression Status");
        println!("{}", "=".repeat(40));
        println!();
        println!("Tasks: {} total across {} levels", total_tasks, tier_count);
        println!("  [x] Completed:   {}", done_tasks);
        println!("  [ ] Available:   {}", available_count);
        println!("  [-] Blocked:     {}", blocked_count);
        println!();
        println!("Objectives: {}/{} complete", done_objectives, total_objectives);

        if let Some(storyline) = &storyline {
            println!();
            println!(
                "Storyline: {} nodes, {} edges, {} endings",
                storyline.nodes().len(),
                storyline.edges().len(),
                storyline.endings().len()
            );
        }

        if dangling > 0 || cycles > 0 {
            println!();
            println!(
                "Problems: {} dangling references, {} cycles (run 'questline check')",
                dangling, cycles
            );
        }
    }

    Ok(())
}

/// Report dangling prerequisites and prerequisite cycles
///
/// Fails when any problem is found so scripts can gate on it.
pub fn check(project: &Project, output: &Output) -> Result<()> {
    let loaded = Loaded::read(project, output)?;
    let dangling = loaded.graph.dangling_references();
    let cycles = loaded.graph.cyclic_groups();

    let storyline_error = if project.storyline_store().exists() {
        match project.storyline() {
            Ok(storyline) => {
                output.verbose_ctx(
                    "check",
                    &format!("Storyline valid: {} nodes", storyline.nodes().len()),
                );
                None
            }
            Err(e) => Some(format!("{:#}", e)),
        }
    } else {
        None
    };

    let problems = dangling.len() + cycles.len() + usize::from(storyline_error.is_some());

    if output.is_json() {
        let dangling_items: Vec<_> = dangling
            .iter()
            .map(|(task, prerequisite)| {
                serde_json::json!({ "task": task, "prerequisite": prerequisite })
            })
            .collect();
        output.data(&serde_json::json!({
            "dangling_references": dangling_items,
            "cycles": cycles,
            "storyline_error": storyline_error,
        }));
    } else if problems == 0 {
        println!("No problems found.");
    } else {
        if !dangling.is_empty() {
            println!("Dangling prerequisites ({}):", dangling.len());
            for (task, prerequisite) in &dangling {
                println!("  {} -> {} (unknown task)", task, prerequisite);
            }
        }
        if !cycles.is_empty() {
            println!("Prerequisite cycles ({}):", cycles.len());
            for group in &cycles {
                let members: Vec<&str> = group.iter().map(|id| id.as_str()).collect();
                println!("  {}", members.join(" <-> "));
            }
        }
        if let Some(error) = &storyline_error {
            println!("Storyline: {}", error);
        }
    }

    if problems > 0 {
        bail!("Found {} problem(s)", problems);
    }

    Ok(())
}
