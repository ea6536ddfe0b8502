// src/resolver/mod.rs

//! Dependency matching, graph queries and migration planning
//!
//! This module provides the repo graph built from normalised manifests, the
//! registry-aware rule deciding whether a dependency refers to a repo, and
//! the wave planner that orders a migration across every dependent.

mod graph;
pub mod matcher;
mod plan;

pub use graph::{GraphStats, RepoGraph, RepoGraphBuilder};
pub use matcher::matches;
pub use plan::{MigrationPlanner, NextMigration, Plan, Wave};
