// src/commands/stats.rs
//! Migration size summary

use anyhow::Result;
use std::path::Path;

use super::{LoadOptions, load_graph, plan_for};

/// Show how many repos a migration touches
pub fn cmd_stats(options: &LoadOptions, components: &[String], manifests: Option<&Path>) -> Result<()> {
    let graph = load_graph(options, manifests)?;
    let planner = plan_for(&graph, components)?;

    let targets: Vec<&str> = planner.targets().iter().map(|r| r.id()).collect();
    println!("Migrating: {}", targets.join(", "));
    let stats = graph.stats();
    println!(
        "Repos considered: {} ({} manifests, {} dependency edges)",
        stats.total_repos, stats.total_manifests, stats.total_edges
    );
    println!("Direct dependents: {}", planner.directly_impacted().len());
    println!("Total dependents: {}", planner.impacted().len());

    let mut impacted: Vec<&str> = planner.impacted().iter().map(|r| r.id()).collect();
    impacted.sort_unstable();
    for id in impacted {
        println!("  {}", id);
    }
    Ok(())
}
