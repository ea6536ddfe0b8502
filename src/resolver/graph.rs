// src/resolver/graph.rs

//! Repository dependency graph
//!
//! Holds every repo of one run and answers direct and transitive dependency
//! and dependent queries. Edges are derived once, with
//! [`matches`](super::matcher::matches), when the builder is finished; the
//! graph is read-only from then on.

use std::collections::{BTreeSet, HashMap, VecDeque};
use tracing::{debug, warn};

use super::matcher::matches;
use crate::error::{AmbiguousRepo, Result};
use crate::manifest::{Manifest, ManifestRecord};
use crate::registry::Registry;
use crate::repo::Repo;

/// Collects repos and manifests before the graph is frozen
#[derive(Debug, Default)]
pub struct RepoGraphBuilder {
    repos: Vec<Repo>,
    index: HashMap<String, usize>,
}

impl RepoGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a repo, merging its manifests into an existing repo with the same id
    pub fn add(&mut self, repo: Repo) -> &mut Self {
        match self.index.get(repo.id()) {
            Some(&pos) => {
                for manifest in repo.manifests().cloned().collect::<Vec<_>>() {
                    self.attach(pos, manifest);
                }
            }
            None => {
                self.index.insert(repo.id().to_string(), self.repos.len());
                self.repos.push(repo);
            }
        }
        self
    }

    /// Attach a manifest to its repo, creating the repo on first sight
    pub fn add_manifest(&mut self, manifest: Manifest) -> &mut Self {
        let pos = match self.index.get(manifest.repo_id()) {
            Some(&pos) => pos,
            None => {
                let pos = self.repos.len();
                self.index.insert(manifest.repo_id().to_string(), pos);
                self.repos.push(Repo::new(manifest.repo_id()));
                pos
            }
        };
        self.attach(pos, manifest);
        self
    }

    /// Parse a raw record and attach its manifest
    ///
    /// Returns false when the record carries no manifest.
    pub fn resolve(&mut self, record: ManifestRecord) -> Result<bool> {
        match record.into_manifest()? {
            Some(manifest) => {
                self.add_manifest(manifest);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn attach(&mut self, pos: usize, manifest: Manifest) {
        let registry = manifest.registry();
        if self.repos[pos].attach(manifest).is_some() {
            warn!(
                "Replaced duplicate {} manifest for {}",
                registry,
                self.repos[pos].id()
            );
        }
    }

    /// Freeze the graph, computing every direct edge
    pub fn build(self) -> RepoGraph {
        let count = self.repos.len();
        let mut dependencies = vec![Vec::new(); count];
        let mut dependents = vec![Vec::new(); count];

        for (from, repo) in self.repos.iter().enumerate() {
            for (to, candidate) in self.repos.iter().enumerate() {
                // A repo is never its own dependency
                if from != to && repo.dependencies().any(|dep| matches(candidate, dep)) {
                    dependencies[from].push(to);
                    dependents[to].push(from);
                }
            }
        }

        let graph = RepoGraph {
            repos: self.repos,
            index: self.index,
            dependencies,
            dependents,
        };
        debug!("Built repo graph: {:?}", graph.stats());
        graph
    }
}

/// Read-only dependency graph over repos
#[derive(Debug)]
pub struct RepoGraph {
    repos: Vec<Repo>,
    index: HashMap<String, usize>,
    /// Outgoing edges: repo -> repos it depends on
    dependencies: Vec<Vec<usize>>,
    /// Reverse edges: repo -> repos depending on it
    dependents: Vec<Vec<usize>>,
}

impl RepoGraph {
    pub fn builder() -> RepoGraphBuilder {
        RepoGraphBuilder::new()
    }

    /// Build a graph straight from manifests
    pub fn from_manifests(manifests: impl IntoIterator<Item = Manifest>) -> Self {
        let mut builder = RepoGraphBuilder::new();
        for manifest in manifests {
            builder.add_manifest(manifest);
        }
        builder.build()
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// All repos in insertion order
    pub fn repos(&self) -> &[Repo] {
        &self.repos
    }

    /// Exact lookup by `org/name` id
    pub fn get(&self, id: &str) -> Option<&Repo> {
        self.index.get(id).map(|&pos| &self.repos[pos])
    }

    /// Resolve a human-typed query to exactly one repo
    ///
    /// Matches on short name first (`o-table`), then on full id
    /// (`Financial-Times/o-table`). Zero or several matches is an
    /// [`AmbiguousRepo`] carrying every candidate.
    pub fn find_one(&self, query: &str) -> std::result::Result<&Repo, AmbiguousRepo> {
        let mut found: Vec<&Repo> = self
            .repos
            .iter()
            .filter(|repo| repo.short_name() == query)
            .collect();
        if found.is_empty() {
            found = self.repos.iter().filter(|repo| repo.id() == query).collect();
        }
        single(found, query, None)
    }

    /// Resolve a declared package name within one registry to exactly one repo
    pub fn find_one_by_registry_name(
        &self,
        name: &str,
        registry: Registry,
    ) -> std::result::Result<&Repo, AmbiguousRepo> {
        let found = self
            .repos
            .iter()
            .filter(|repo| repo.name(registry) == Some(name))
            .collect();
        single(found, name, Some(registry))
    }

    /// Repos declaring at least one dependency that matches `repo`
    pub fn direct_dependents(&self, repo: &Repo) -> Vec<&Repo> {
        self.collect(self.direct_dependent_positions(repo))
    }

    /// Every repo depending on `repo` directly or indirectly
    pub fn dependents(&self, repo: &Repo) -> Vec<&Repo> {
        let start = self.direct_dependent_positions(repo);
        self.collect(self.closure(repo, start, &self.dependents))
    }

    /// Repos matched by one of `repo`'s own dependencies
    pub fn direct_dependencies(&self, repo: &Repo) -> Vec<&Repo> {
        self.collect(self.direct_dependency_positions(repo))
    }

    /// Every repo `repo` depends on directly or indirectly
    pub fn dependencies(&self, repo: &Repo) -> Vec<&Repo> {
        let start = self.direct_dependency_positions(repo);
        self.collect(self.closure(repo, start, &self.dependencies))
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            total_repos: self.repos.len(),
            total_manifests: self.repos.iter().map(|r| r.manifests().count()).sum(),
            total_edges: self.dependencies.iter().map(Vec::len).sum(),
            max_dependencies: self.dependencies.iter().map(Vec::len).max().unwrap_or(0),
            max_dependents: self.dependents.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    fn position(&self, repo: &Repo) -> Option<usize> {
        self.index.get(repo.id()).copied()
    }

    // Repos that are not part of this graph are matched on the fly.
    fn direct_dependent_positions(&self, repo: &Repo) -> Vec<usize> {
        match self.position(repo) {
            Some(pos) => self.dependents[pos].clone(),
            None => (0..self.repos.len())
                .filter(|&pos| self.repos[pos].dependencies().any(|dep| matches(repo, dep)))
                .collect(),
        }
    }

    fn direct_dependency_positions(&self, repo: &Repo) -> Vec<usize> {
        match self.position(repo) {
            Some(pos) => self.dependencies[pos].clone(),
            None => (0..self.repos.len())
                .filter(|&pos| repo.dependencies().any(|dep| matches(&self.repos[pos], dep)))
                .collect(),
        }
    }

    /// Breadth-first transitive closure over `edges`, never revisiting a repo
    ///
    /// The origin is marked visited up front, so a cycle back to it neither
    /// loops nor reports the origin as its own dependent.
    fn closure(&self, origin: &Repo, start: Vec<usize>, edges: &[Vec<usize>]) -> BTreeSet<usize> {
        let mut visited = BTreeSet::new();
        let origin = self.position(origin);
        let mut queue: VecDeque<usize> = start.into_iter().collect();

        while let Some(pos) = queue.pop_front() {
            if Some(pos) == origin || !visited.insert(pos) {
                continue;
            }
            queue.extend(edges[pos].iter().copied());
        }
        visited
    }

    fn collect(&self, positions: impl IntoIterator<Item = usize>) -> Vec<&Repo> {
        positions.into_iter().map(|pos| &self.repos[pos]).collect()
    }
}

fn single<'a>(
    found: Vec<&'a Repo>,
    query: &str,
    registry: Option<Registry>,
) -> std::result::Result<&'a Repo, AmbiguousRepo> {
    match found.as_slice() {
        [repo] => Ok(*repo),
        _ => Err(AmbiguousRepo {
            query: query.to_string(),
            registry,
            candidates: found.iter().map(|repo| repo.id().to_string()).collect(),
        }),
    }
}

/// Statistics about the repo graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub total_repos: usize,
    pub total_manifests: usize,
    pub total_edges: usize,
    pub max_dependencies: usize,
    pub max_dependents: usize,
}
