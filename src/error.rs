// src/error.rs

//! Error types for ripple
//!
//! One enum covers every failure the core can report. Malformed input and
//! registry lookup failures are recovered by the caller that sees them
//! (records are skipped, manifests are renamed); ambiguous names and cyclic
//! plans are surfaced to the collaborator driving the run.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::registry::Registry;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// A name query that did not resolve to exactly one repo
///
/// Carries the candidate repo ids so the caller can pick one (and re-query
/// by id) or abort. An empty candidate list means nothing matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousRepo {
    pub query: String,
    pub registry: Option<Registry>,
    pub candidates: Vec<String>,
}

impl AmbiguousRepo {
    /// True when nothing matched at all
    pub fn is_missing(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl fmt::Display for AmbiguousRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "found {} repos which match \"{}\"",
            self.candidates.len(),
            self.query
        )?;
        if let Some(registry) = self.registry {
            write!(f, " for registry \"{registry}\"")?;
        }
        if !self.candidates.is_empty() {
            write!(f, ": {}", self.candidates.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("registry \"{0}\" must be either \"npm\" or \"bower\"")]
    InvalidRegistry(String),

    #[error("unsupported manifest file \"{0}\"")]
    UnsupportedManifestFile(String),

    #[error("malformed manifest record: {0}")]
    MalformedRecord(#[source] serde_json::Error),

    #[error("malformed {registry} manifest for {repo_id}: {source}")]
    MalformedManifest {
        repo_id: String,
        registry: Registry,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot read manifest records: {0}")]
    ReadRecords(#[source] std::io::Error),

    #[error("{0}")]
    AmbiguousRepo(AmbiguousRepo),

    #[error("cyclic dependency: no progress at step {step}, stalled on {}", stalled.join(", "))]
    CyclicDependency { step: usize, stalled: Vec<String> },

    #[error("registry lookup failed: {0}")]
    Registry(String),

    #[error("cannot read cache '{}': {source}", path.display())]
    CacheRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write cache '{}': {source}", path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read config '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("cannot start verification workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl From<AmbiguousRepo> for Error {
    fn from(ambiguous: AmbiguousRepo) -> Self {
        Self::AmbiguousRepo(ambiguous)
    }
}
