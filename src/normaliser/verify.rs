// src/normaliser/verify.rs

//! Registry identity verification
//!
//! A declared name only matters when some other manifest depends on it. For
//! those manifests the registry is asked which repository the name is
//! published from; unless the answer names the manifest's own repo, the
//! declared name is replaced so the manifest cannot be matched by mistake.
//!
//! Lookups run on a bounded rayon pool. Outcomes are memoised in a
//! [`NameCache`] keyed by the manifest's identity fields, so a rerun over the
//! same snapshot makes no network calls.

use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use super::conflicts::placeholder_name;
use super::{NormaliseReport, Rename, RenameReason};
use crate::error::Result;
use crate::hash::ContentKey;
use crate::manifest::Manifest;
use crate::registry::Registry;
use crate::repository::{NameCache, RegistryLookup};

/// Length of the random suffix on unverified names
const SUFFIX_LEN: usize = 10;

/// Lookup client, outcome cache and pool size for Phase C
pub struct Verifier {
    lookup: Box<dyn RegistryLookup>,
    cache: Box<dyn NameCache>,
    workers: usize,
}

/// A lookup that still has to go over the wire
struct Pending {
    index: usize,
    key: ContentKey,
    registry: Registry,
    repo_id: String,
    name: String,
}

impl Verifier {
    /// Create a verifier, loading the cache
    pub fn new(lookup: Box<dyn RegistryLookup>, mut cache: Box<dyn NameCache>) -> Result<Self> {
        cache.load()?;
        Ok(Self {
            lookup,
            cache,
            workers: host_parallelism(),
        })
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Verify every referenced manifest, renaming those that fail
    pub(crate) fn run(&mut self, manifests: &mut [Manifest], report: &mut NormaliseReport) -> Result<()> {
        let referenced = referenced_names(manifests);
        let mut pending = Vec::new();

        for (index, manifest) in manifests.iter_mut().enumerate() {
            let Some(name) = manifest.declared_name().map(str::to_string) else {
                continue;
            };
            if !is_referenced(&referenced, manifest, &name) {
                continue;
            }

            let key = cache_key(manifest, &name);
            match self.cache.get(&key) {
                Some(resolved) => {
                    report.cache_hits += 1;
                    if resolved == name {
                        report.verified += 1;
                    } else {
                        debug!(
                            "Cached: {} {} does not publish \"{}\"",
                            manifest.registry(),
                            manifest.repo_id(),
                            name
                        );
                        rename_unverified(manifest, name, resolved, report);
                    }
                }
                None => pending.push(Pending {
                    index,
                    key,
                    registry: manifest.registry(),
                    repo_id: manifest.repo_id().to_string(),
                    name,
                }),
            }
        }

        if pending.is_empty() {
            return Ok(());
        }

        info!(
            "Verifying {} name(s) against the registries with {} worker(s)",
            pending.len(),
            self.workers
        );
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;
        let lookup = self.lookup.as_ref();
        let outcomes: Vec<bool> =
            pool.install(|| pending.par_iter().map(|p| verify_one(lookup, p)).collect());

        for (p, verified) in pending.into_iter().zip(outcomes) {
            if verified {
                report.verified += 1;
                self.cache.set(p.key, p.name);
            } else {
                let placeholder = format!("{}-{}", p.name, &placeholder_name()[..SUFFIX_LEN]);
                self.cache.set(p.key, placeholder.clone());
                rename_unverified(&mut manifests[p.index], p.name, placeholder, report);
            }
        }
        Ok(())
    }

    /// Persist the outcome cache
    pub(crate) fn flush(&mut self) -> Result<()> {
        self.cache.flush()
    }
}

/// Worker count when none is configured
pub fn host_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(1)
}

fn cache_key(manifest: &Manifest, name: &str) -> ContentKey {
    ContentKey::of(&[
        manifest.registry().as_ref(),
        manifest.repo_id(),
        name,
        manifest.source_url(),
    ])
}

/// Registry-qualified names depended on by name, with the repos depending on them
fn referenced_names(manifests: &[Manifest]) -> HashMap<(Registry, String), HashSet<String>> {
    let mut referenced: HashMap<(Registry, String), HashSet<String>> = HashMap::new();
    for manifest in manifests {
        for dep in manifest.dependencies().iter().filter(|dep| dep.is_by_name()) {
            referenced
                .entry((dep.registry(), dep.name().to_string()))
                .or_default()
                .insert(manifest.repo_id().to_string());
        }
    }
    referenced
}

/// Whether a repo other than the manifest's own depends on `name`
fn is_referenced(
    referenced: &HashMap<(Registry, String), HashSet<String>>,
    manifest: &Manifest,
    name: &str,
) -> bool {
    referenced
        .get(&(manifest.registry(), name.to_string()))
        .is_some_and(|by| by.iter().any(|id| id != manifest.repo_id()))
}

/// One registry round-trip. Failures count as unverified.
fn verify_one(lookup: &dyn RegistryLookup, p: &Pending) -> bool {
    match lookup.repository_url(p.registry, &p.name) {
        Ok(Some(url)) => {
            let verified = url.to_lowercase().contains(&p.repo_id.to_lowercase());
            if !verified {
                debug!(
                    "{}:{} is published from {}, not {}",
                    p.registry, p.name, url, p.repo_id
                );
            }
            verified
        }
        Ok(None) => {
            debug!("{}:{} is not published", p.registry, p.name);
            false
        }
        Err(e) => {
            warn!("Could not verify {}:{} for {}: {}", p.registry, p.name, p.repo_id, e);
            false
        }
    }
}

fn rename_unverified(manifest: &mut Manifest, from: String, to: String, report: &mut NormaliseReport) {
    warn!(
        "{} name \"{}\" of {} is unverified, renaming to \"{}\"",
        manifest.registry(),
        from,
        manifest.repo_id(),
        to
    );
    manifest.rename(to.clone());
    report.renames.push(Rename {
        repo_id: manifest.repo_id().to_string(),
        registry: manifest.registry(),
        from,
        to,
        reason: RenameReason::Unverified,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::repository::MemoryCache;

    /// Answers from a fixed table
    struct FakeRegistry {
        published: HashMap<String, String>,
    }

    impl FakeRegistry {
        fn new(published: &[(&str, &str)]) -> Self {
            Self {
                published: published
                    .iter()
                    .map(|(name, url)| (name.to_string(), url.to_string()))
                    .collect(),
            }
        }
    }

    impl RegistryLookup for FakeRegistry {
        fn repository_url(&self, _registry: Registry, name: &str) -> Result<Option<String>> {
            if name == "offline" {
                return Err(Error::Registry("connection refused".to_string()));
            }
            Ok(self.published.get(name).cloned())
        }
    }

    fn fixture() -> Vec<Manifest> {
        vec![
            Manifest::new("org/a", Registry::Npm, Some("a".to_string()), ""),
            Manifest::new("org/b", Registry::Npm, Some("b".to_string()), ""),
            Manifest::new("org/c", Registry::Npm, Some("offline".to_string()), ""),
            Manifest::new("org/unused", Registry::Npm, Some("unused".to_string()), ""),
            Manifest::new("org/app", Registry::Npm, Some("app".to_string()), "")
                .with_dependency("a", "^1.0.0")
                .with_dependency("b", "^1.0.0")
                .with_dependency("offline", "latest"),
        ]
    }

    fn verifier() -> Verifier {
        let registry = FakeRegistry::new(&[
            ("a", "git+https://github.com/Org/A.git"),
            ("b", "https://github.com/someone-else/b.git"),
        ]);
        Verifier::new(Box::new(registry), Box::new(MemoryCache::new()))
            .unwrap()
            .with_workers(2)
    }

    #[test]
    fn test_only_referenced_names_are_checked() {
        let mut manifests = fixture();
        let mut report = NormaliseReport::default();
        verifier().run(&mut manifests, &mut report).unwrap();

        // a verifies case-insensitively; b is someone else's; offline fails
        assert_eq!(manifests[0].declared_name(), Some("a"));
        assert!(manifests[1].declared_name().unwrap().starts_with("b-"));
        assert_eq!(manifests[1].declared_name().unwrap().len(), "b-".len() + SUFFIX_LEN);
        assert!(manifests[2].declared_name().unwrap().starts_with("offline-"));
        assert_eq!(manifests[3].declared_name(), Some("unused"));
        assert_eq!(manifests[4].declared_name(), Some("app"));

        assert_eq!(report.verified, 1);
        assert_eq!(report.renames.len(), 2);
        assert!(report.renames.iter().all(|r| r.reason == RenameReason::Unverified));
    }

    #[test]
    fn test_cache_replays_outcomes() {
        let mut verifier = verifier();
        let mut first = fixture();
        verifier.run(&mut first, &mut NormaliseReport::default()).unwrap();

        let mut second = fixture();
        let mut report = NormaliseReport::default();
        verifier.run(&mut second, &mut report).unwrap();

        assert_eq!(report.cache_hits, 3);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.declared_name(), b.declared_name());
        }
    }

    #[test]
    fn test_self_reference_does_not_count() {
        let mut manifests = vec![
            Manifest::new("org/a", Registry::Npm, Some("a".to_string()), "").with_dependency("a", "^1.0.0"),
        ];
        let mut report = NormaliseReport::default();
        verifier().run(&mut manifests, &mut report).unwrap();
        assert_eq!(report.verified, 0);
        assert!(report.renames.is_empty());
    }
}
