// src/commands/guide.rs
//! Step-by-step migration guide

use anyhow::Result;
use ripple::resolver::matches;
use ripple::{Dependency, MigrationPlanner, Repo};
use std::path::Path;

use super::{LoadOptions, load_graph, plan_for};

/// Print each migration wave with the dependencies that put a repo in it
pub fn cmd_guide(options: &LoadOptions, components: &[String], manifests: Option<&Path>) -> Result<()> {
    let graph = load_graph(options, manifests)?;
    let planner = plan_for(&graph, components)?;

    let targets: Vec<&str> = planner.targets().iter().map(|r| r.short_name()).collect();
    println!(
        "Migration guide for {} ({} dependent repo(s))",
        targets.join(", "),
        planner.impacted().len()
    );

    let mut steps = 0;
    for wave in planner.plan() {
        let wave = wave?;
        steps = wave.step;
        println!();
        println!("Step {}:", wave.step);
        for repo in &wave.dependents {
            println!("  {}", repo.id());
            for dep in forcing_dependencies(&planner, repo) {
                println!("      {} {}", dep, dep.version_spec());
            }
        }
    }

    println!();
    if steps == 0 {
        println!("Nothing depends on {}; no migration needed.", targets.join(", "));
    } else {
        println!("Migration complete after {} step(s).", steps);
    }
    Ok(())
}

/// `repo`'s dependencies on a target or another impacted repo
fn forcing_dependencies<'r>(planner: &MigrationPlanner<'_>, repo: &'r Repo) -> Vec<&'r Dependency> {
    repo.dependencies()
        .filter(|dep| {
            planner
                .targets()
                .iter()
                .chain(planner.impacted())
                .any(|moving| matches(moving, dep))
        })
        .collect()
}
