//! Storyline path command

use anyhow::{bail, Result};

use super::output::Output;
use crate::domain::{classify_node, CostBucket, PathSummary, Storyline, TimeCost};
use crate::storage::Project;

/// Resolve the route to a node, or summarize every ending
pub fn run(project: &Project, output: &Output, target: Option<&str>) -> Result<()> {
    let storyline = project.storyline()?;
    output.verbose_ctx(
        "path",
        &format!(
            "Loaded storyline: {} nodes, {} edges, root '{}'",
            storyline.nodes().len(),
            storyline.edges().len(),
            storyline.root()
        ),
    );

    match target {
        Some(target) => show_route(&storyline, output, target),
        None => show_endings(&storyline, output),
    }
}

fn show_route(storyline: &Storyline, output: &Output, target: &str) -> Result<()> {
    if storyline.node(target).is_none() {
        bail!("Unknown storyline node: {}", target);
    }

    let resolved = storyline.resolve(target);
    let reachable = !resolved.is_unreachable(target);
    output.verbose_ctx(
        "path",
        &format!("Resolved {} nodes, {} edges", resolved.nodes.len(), resolved.edge_ids.len()),
    );

    if output.is_json() {
        let nodes: Vec<_> = resolved
            .nodes
            .iter()
            .map(|node| {
                serde_json::json!({
                    "id": node.id(),
                    "type": node.kind(),
                    "title": node.title(),
                    "cost": node.cost(),
                    "classification": classify_node(node),
                })
            })
            .collect();
        output.data(&serde_json::json!({
            "target": target,
            "reachable": reachable,
            "nodes": nodes,
            "edges": resolved.edge_ids,
            "summary": resolved.summary,
        }));
        return Ok(());
    }

    if !reachable {
        println!("'{}' is not reachable from '{}'.", target, storyline.root());
        return Ok(());
    }

    println!("Route to {} ({} steps):", target, resolved.summary.steps);
    for (i, node) in resolved.nodes.iter().enumerate() {
        let title = node.title().unwrap_or(node.id().as_str());
        let mut line = format!("  {:>2}. [{}] {}", i + 1, node.kind(), title);

        let class = classify_node(node);
        match class.cost {
            Some(CostBucket::Currency(c)) => line.push_str(&format!("  cost {}", c)),
            Some(CostBucket::AltCurrency(c)) => line.push_str(&format!("  cost {} (alt)", c)),
            Some(CostBucket::Reward(c)) => line.push_str(&format!("  reward {}", -c)),
            None => {}
        }
        match class.time {
            Some(TimeCost::Craft { hours }) => line.push_str(&format!("  craft {}h", hours)),
            Some(TimeCost::TimeGate { hours }) => line.push_str(&format!("  wait {}h", hours)),
            None => {}
        }

        println!("{}", line);
    }

    println!();
    print_summary(&resolved.summary);

    Ok(())
}

fn show_endings(storyline: &Storyline, output: &Output) -> Result<()> {
    let endings = storyline.endings();
    output.verbose_ctx("path", &format!("Found {} endings", endings.len()));

    if output.is_json() {
        let items: Vec<_> = endings
            .iter()
            .map(|ending| {
                let resolved = storyline.resolve(ending.id().as_str());
                serde_json::json!({
                    "id": ending.id(),
                    "title": ending.title(),
                    "reachable": !resolved.is_unreachable(ending.id().as_str()),
                    "summary": resolved.summary,
                })
            })
            .collect();
        output.data(&items);
        return Ok(());
    }

    if endings.is_empty() {
        println!("No endings in storyline.");
        return Ok(());
    }

    println!("Endings ({}):", endings.len());
    for ending in endings {
        let id = ending.id().as_str();
        let resolved = storyline.resolve(id);
        let title = ending.title().unwrap_or(id);

        if resolved.is_unreachable(id) {
            println!("  {:<20} {} (unreachable)", id, title);
        } else {
            let summary = &resolved.summary;
            println!(
                "  {:<20} {}  {} steps, cost {} + {} alt",
                id, title, summary.steps, summary.total_cost_currency, summary.total_cost_alt_currency
            );
        }
    }

    Ok(())
}

fn print_summary(summary: &PathSummary) {
    println!("Summary:");
    println!("  Steps:          {}", summary.steps);
    println!("  Currency:       {}", summary.total_cost_currency);
    println!("  Alt currency:   {}", summary.total_cost_alt_currency);
    println!("  Crafting hours: {}", summary.total_craft_hours);
    println!("  Waiting hours:  {}", summary.total_time_gate_hours);
}
