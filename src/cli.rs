// src/cli.rs
//! CLI definitions for ripple
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `stats` - How many repos a migration touches
//! - `guide` - The migration waves, with the dependencies behind each repo
//! - `dot` - The migration waves as a Graphviz graph

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ripple")]
#[command(version)]
#[command(about = "Plans dependency-safe migration waves across npm and bower repositories", long_about = None)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip checking declared names against the registries
    #[arg(long, global = true)]
    pub no_verify: bool,

    /// Keep registry verification results in memory only
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count the repos impacted by migrating the given components
    Stats(TargetArgs),

    /// Print the migration waves step by step
    Guide(TargetArgs),

    /// Print the migration waves as a Graphviz DOT graph
    Dot(TargetArgs),
}

#[derive(Args)]
pub struct TargetArgs {
    /// Components to migrate, by repo name or full org/name id
    #[arg(required = true)]
    pub components: Vec<String>,

    /// Manifest records, one JSON object per line (default: stdin)
    #[arg(short, long)]
    pub manifests: Option<PathBuf>,
}
