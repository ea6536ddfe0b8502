// src/commands/mod.rs
//! Command handlers for the ripple CLI

mod dot;
mod guide;
mod stats;

pub use dot::cmd_dot;
pub use guide::cmd_guide;
pub use stats::cmd_stats;

use anyhow::{Context, Result};
use ripple::{
    Config, ManifestNormaliser, MigrationPlanner, RepoGraph, build_graph, read_records,
};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;

/// Global flags that shape how manifests are loaded
pub struct LoadOptions {
    pub config: Option<PathBuf>,
    pub no_verify: bool,
    pub no_cache: bool,
}

/// Read, normalise and link manifest records from `source` (stdin when `None`)
///
/// Skipped records and naming conflicts are summarised on stderr; the
/// details are logged as they are found.
pub fn load_graph(options: &LoadOptions, source: Option<&Path>) -> Result<RepoGraph> {
    let config = Config::load_or_default(options.config.as_deref())?;
    let mut normaliser =
        ManifestNormaliser::from_config(&config, options.no_verify, options.no_cache)?;

    let batch = match source {
        Some(path) => {
            info!("Reading manifest records from {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("Failed to open manifest records {}", path.display()))?;
            read_records(BufReader::new(file))?
        }
        None => {
            info!("Reading manifest records from stdin");
            read_records(io::stdin().lock())?
        }
    };

    let unparsed = batch.skipped.len();
    let ingest = build_graph(batch.records, &mut normaliser)?;

    let skipped = unparsed + ingest.skipped.len();
    if skipped > 0 {
        eprintln!("warning: skipped {} unusable manifest record(s)", skipped);
    }
    for conflict in &ingest.report.conflicts {
        eprintln!("warning: unresolved naming conflict: {}", conflict);
    }
    Ok(ingest.graph)
}

/// Resolve component names to a planner
///
/// An unknown or ambiguous name fails with the candidate ids in the message.
pub fn plan_for<'g>(graph: &'g RepoGraph, components: &[String]) -> Result<MigrationPlanner<'g>> {
    MigrationPlanner::new(graph, components).map_err(|e| match e {
        ripple::Error::AmbiguousRepo(ambiguous) if !ambiguous.is_missing() => anyhow::anyhow!(
            "{}\nUse the full org/name id to pick one",
            ambiguous
        ),
        other => other.into(),
    })
}
