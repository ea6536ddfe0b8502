// src/lib.rs

//! Ripple migration planner
//!
//! Works out the order in which the dependents of a front-end component must
//! be migrated, from a snapshot of every repository's `package.json` and
//! `bower.json`.
//!
//! # Architecture
//!
//! - Ingestion: raw manifest records become [`Manifest`]s; bad records are skipped
//! - Normalisation: declared names are corrected, de-conflicted and verified
//!   against the registries before anything is matched on them
//! - Graph: [`RepoGraph`] links repos through registry-aware dependency matching
//! - Planning: [`MigrationPlanner`] emits dependency-safe waves, lazily

pub mod config;
mod error;
pub mod hash;
pub mod ingest;
pub mod manifest;
pub mod normaliser;
pub mod registry;
pub mod repo;
pub mod repository;
pub mod resolver;
pub mod version;

pub use config::Config;
pub use error::{AmbiguousRepo, Error, Result};
pub use ingest::{Ingest, RecordBatch, SkippedRecord, build_graph, read_records};
pub use manifest::{Dependency, Manifest, ManifestRecord};
pub use normaliser::{ManifestNormaliser, NamingConflict, NormaliseReport, Rename, RenameReason};
pub use registry::Registry;
pub use repo::Repo;
pub use resolver::{MigrationPlanner, RepoGraph, Wave};
