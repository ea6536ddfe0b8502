// src/commands/dot.rs
//! Graphviz rendering of migration waves
//!
//! One cluster per step, with the targets as step 0. Edges run from a repo
//! in the previous cluster to the repos in the current cluster that depend
//! on it directly.

use anyhow::Result;
use ripple::{MigrationPlanner, Repo};
use std::fmt::Write;
use std::path::Path;

use super::{LoadOptions, load_graph, plan_for};

/// Print the migration waves as a DOT graph
pub fn cmd_dot(options: &LoadOptions, components: &[String], manifests: Option<&Path>) -> Result<()> {
    let graph = load_graph(options, manifests)?;
    let planner = plan_for(&graph, components)?;
    print!("{}", render_dot(&planner)?);
    Ok(())
}

/// Render the whole plan; fails on a cyclic dependency
pub fn render_dot(planner: &MigrationPlanner<'_>) -> Result<String> {
    let graph = planner.graph();
    let mut out = String::new();

    writeln!(out, "digraph migration {{")?;
    writeln!(out, "  rankdir=LR;")?;
    writeln!(out, "  node [shape=box];")?;
    write_cluster(&mut out, 0, "targets", planner.targets())?;

    let mut previous: Vec<&Repo> = planner.targets().to_vec();
    let mut edges = String::new();
    for wave in planner.plan() {
        let wave = wave?;
        write_cluster(&mut out, wave.step, &format!("step {}", wave.step), &wave.dependents)?;

        for from in &previous {
            let dependents = graph.direct_dependents(from);
            for to in wave
                .dependents
                .iter()
                .filter(|to| dependents.iter().any(|d| d.id() == to.id()))
            {
                writeln!(edges, "  {} -> {};", quote(from.id()), quote(to.id()))?;
            }
        }
        previous = wave.dependents;
    }

    out.push_str(&edges);
    writeln!(out, "}}")?;
    Ok(out)
}

fn write_cluster(out: &mut String, step: usize, label: &str, repos: &[&Repo]) -> std::fmt::Result {
    writeln!(out, "  subgraph cluster_{} {{", step)?;
    writeln!(out, "    label={};", quote(label))?;
    for repo in repos {
        writeln!(out, "    {};", quote(repo.id()))?;
    }
    writeln!(out, "  }}")
}

fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}
