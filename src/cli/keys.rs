//! Objective keys command
//!
//! Shows where a task's objective progress is persisted and what the
//! snapshot currently holds for it, under stable or legacy keys.

use anyhow::Result;

use super::output::Output;
use super::query::Loaded;
use crate::storage::{CatalogError, Project};

/// Show objective keys and progress for a task
pub fn run(project: &Project, output: &Output, task_id: &str) -> Result<()> {
    let loaded = Loaded::read(project, output)?;

    let task = loaded
        .tasks
        .iter()
        .find(|t| t.id.as_str() == task_id)
        .ok_or_else(|| CatalogError::TaskNotFound(task_id.to_string()))?;

    let completed = &loaded.progress.completed_tasks;
    let objectives = loaded.objective_progress(task);
    let level = loaded.graph.levels().get(&task.id).copied().unwrap_or(0);
    let available = loaded.graph.is_available(task_id, completed);
    let dependents = loaded.graph.dependents(task_id);

    output.verbose_ctx(
        "keys",
        &format!("Derived {} objective keys for {}", objectives.len(), task.id),
    );

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "name": task.display_name(),
            "level": level,
            "completed": loaded.progress.is_task_complete(task_id),
            "available": available,
            "prerequisites": task.prerequisites,
            "dependents": dependents,
            "objectives": objectives,
        }));
        return Ok(());
    }

    let state = if loaded.progress.is_task_complete(task_id) {
        "completed"
    } else if available {
        "available"
    } else {
        "blocked"
    };

    println!("{} - {}", task.id, task.display_name());
    println!("Level {}, {}", level, state);

    if !task.prerequisites.is_empty() {
        let ids: Vec<&str> = task.prerequisites.iter().map(|id| id.as_str()).collect();
        println!("Prerequisites: {}", ids.join(", "));
    }
    if !dependents.is_empty() {
        let ids: Vec<&str> = dependents.iter().map(|id| id.as_str()).collect();
        println!("Unlocks: {}", ids.join(", "));
    }

    println!();
    if objectives.is_empty() {
        println!("No objectives.");
        return Ok(());
    }

    println!("Objectives ({}):", objectives.len());
    for objective in &objectives {
        let mark = if objective.complete { "x" } else { " " };
        println!("  [{}] {}", mark, objective.description);
        println!("      key:    {}", objective.key);
        println!("      legacy: {}", objective.legacy_key);

        for item in &objective.items {
            println!("      - {} ({}): {}", item.name, item.item_id, item.count);
            if output.is_verbose() {
                println!("        key:    {}", item.key);
                println!("        legacy: {}", item.legacy_key);
            }
        }
    }

    Ok(())
}
