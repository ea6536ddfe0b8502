// src/main.rs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::LoadOptions;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries command output only
    let default_filter = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = LoadOptions {
        config: cli.config,
        no_verify: cli.no_verify,
        no_cache: cli.no_cache,
    };

    match cli.command {
        Commands::Stats(target) => {
            commands::cmd_stats(&options, &target.components, target.manifests.as_deref())
        }
        Commands::Guide(target) => {
            commands::cmd_guide(&options, &target.components, target.manifests.as_deref())
        }
        Commands::Dot(target) => {
            commands::cmd_dot(&options, &target.components, target.manifests.as_deref())
        }
    }
}
