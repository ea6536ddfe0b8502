// src/normaliser/mod.rs

//! Manifest name normalisation
//!
//! Declared names decide which repos a by-name dependency matches, so they
//! are corrected before the graph is built. Three phases run in order:
//!
//! - **A. naming rules**: pluggable rewrites for known publish conventions
//! - **B. conflict resolution**: one winner per shared `(registry, name)`
//! - **C. verification**: referenced names are checked against the registry
//!
//! Every rename is recorded in the returned [`NormaliseReport`]. Phase C is
//! optional; without it the normaliser makes no network calls.

mod conflicts;
mod rules;
mod verify;

pub use conflicts::NamingConflict;
pub use rules::{NamingRule, PatternRule};
pub use verify::{Verifier, host_parallelism};

use std::fmt;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::registry::Registry;
use crate::repository::{JsonFileCache, MemoryCache, NameCache, RegistryClient, RegistryLookup};

/// Why a declared name was replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameReason {
    /// A naming rule rewrote it
    NamingRule(String),
    /// Another repo won the name
    ConflictLoser { winner: String },
    /// The registry does not publish the name from this repo
    Unverified,
}

impl fmt::Display for RenameReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenameReason::NamingRule(rule) => write!(f, "naming rule {}", rule),
            RenameReason::ConflictLoser { winner } => write!(f, "name belongs to {}", winner),
            RenameReason::Unverified => write!(f, "not verified by the registry"),
        }
    }
}

/// One declared-name change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub repo_id: String,
    pub registry: Registry,
    pub from: String,
    pub to: String,
    pub reason: RenameReason,
}

impl fmt::Display for Rename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: \"{}\" -> \"{}\" ({})",
            self.registry, self.repo_id, self.from, self.to, self.reason
        )
    }
}

/// What one normalisation pass changed and found
#[derive(Debug, Clone, Default)]
pub struct NormaliseReport {
    pub renames: Vec<Rename>,
    pub conflicts: Vec<NamingConflict>,
    /// Names confirmed by the registry, cached or live
    pub verified: usize,
    /// Verification outcomes served from the cache
    pub cache_hits: usize,
}

impl NormaliseReport {
    pub fn is_clean(&self) -> bool {
        self.renames.is_empty() && self.conflicts.is_empty()
    }
}

/// Corrects declared names before graph construction
#[derive(Default)]
pub struct ManifestNormaliser {
    rules: Vec<Box<dyn NamingRule>>,
    verifier: Option<Verifier>,
}

impl ManifestNormaliser {
    /// No rules, no verification
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule to the Phase A chain
    pub fn with_rule(mut self, rule: impl NamingRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Enable Phase C; the cache is loaded here
    pub fn with_verification(
        mut self,
        lookup: impl RegistryLookup + 'static,
        cache: impl NameCache + 'static,
    ) -> Result<Self> {
        self.verifier = Some(Verifier::new(Box::new(lookup), Box::new(cache))?);
        Ok(self)
    }

    /// Bound the number of concurrent registry lookups
    pub fn with_concurrency(mut self, workers: usize) -> Self {
        self.verifier = self.verifier.map(|v| v.with_workers(workers));
        self
    }

    /// Build from configuration
    ///
    /// `no_verify` skips Phase C regardless of the config; `no_cache` keeps
    /// verification outcomes in memory only.
    pub fn from_config(config: &Config, no_verify: bool, no_cache: bool) -> Result<Self> {
        let mut normaliser = Self::new();
        for rule in config.naming_rules()? {
            normaliser = normaliser.with_rule(rule);
        }

        if no_verify || !config.registry.verify {
            debug!("Registry verification disabled");
            return Ok(normaliser);
        }

        let client = RegistryClient::new(&config.registry)?;
        normaliser = match config.cache.resolved_path() {
            Some(path) if !no_cache => {
                debug!("Using verification cache {}", path.display());
                normaliser.with_verification(client, JsonFileCache::new(path))?
            }
            _ => normaliser.with_verification(client, MemoryCache::new())?,
        };
        Ok(normaliser.with_concurrency(config.registry.workers()))
    }

    pub fn is_verifying(&self) -> bool {
        self.verifier.is_some()
    }

    /// Run all phases over `manifests`, then flush the verification cache
    pub fn normalise(&mut self, manifests: &mut [Manifest]) -> Result<NormaliseReport> {
        let mut report = NormaliseReport::default();

        self.apply_rules(manifests, &mut report);
        conflicts::resolve_conflicts(manifests, &mut report);
        if let Some(verifier) = self.verifier.as_mut() {
            verifier.run(manifests, &mut report)?;
            verifier.flush()?;
        }

        info!(
            "Normalised {} manifest(s): {} renamed, {} conflict(s), {} verified",
            manifests.len(),
            report.renames.len(),
            report.conflicts.len(),
            report.verified
        );
        Ok(report)
    }

    fn apply_rules(&self, manifests: &mut [Manifest], report: &mut NormaliseReport) {
        for manifest in manifests.iter_mut() {
            for rule in &self.rules {
                let Some(name) = rule.apply(manifest) else {
                    continue;
                };
                debug!(
                    "Rule {} renames {} {} to \"{}\"",
                    rule.name(),
                    manifest.registry(),
                    manifest.repo_id(),
                    name
                );
                if let Some(from) = manifest.rename(name.clone()) {
                    report.renames.push(Rename {
                        repo_id: manifest.repo_id().to_string(),
                        registry: manifest.registry(),
                        from,
                        to: name,
                        reason: RenameReason::NamingRule(rule.name().to_string()),
                    });
                }
            }
        }
    }
}
