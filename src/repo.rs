// src/repo.rs

//! Repository entities
//!
//! A [`Repo`] is identified by its `org/name` id and holds at most one
//! manifest per registry. A repo may have no manifest for a registry; it
//! then has no declared name there and cannot be depended on by name.

use std::collections::BTreeMap;

use crate::manifest::{Dependency, Manifest};
use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    id: String,
    org: String,
    short_name: String,
    manifests: BTreeMap<Registry, Manifest>,
}

impl Repo {
    /// Create a repo from its `org/name` id
    ///
    /// An id without `/` has an empty org and is its own short name.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let (org, short_name) = match id.split_once('/') {
            Some((org, name)) => (org.to_string(), name.to_string()),
            None => (String::new(), id.clone()),
        };
        Self {
            id,
            org,
            short_name,
            manifests: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    /// The repository name without its org, e.g. `o-table`
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// The name this repo is published under in `registry`, if any
    pub fn name(&self, registry: Registry) -> Option<&str> {
        self.manifests
            .get(&registry)
            .and_then(Manifest::declared_name)
    }

    pub fn manifest(&self, registry: Registry) -> Option<&Manifest> {
        self.manifests.get(&registry)
    }

    pub fn manifests(&self) -> impl Iterator<Item = &Manifest> {
        self.manifests.values()
    }

    /// Dependencies declared across every registry
    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.manifests.values().flat_map(|m| m.dependencies().iter())
    }

    /// Dependencies declared in one registry's manifest
    pub fn dependencies_for(&self, registry: Registry) -> impl Iterator<Item = &Dependency> {
        self.manifests
            .get(&registry)
            .into_iter()
            .flat_map(|m| m.dependencies().iter())
    }

    /// Attach a manifest for its registry, returning any manifest it replaced
    pub(crate) fn attach(&mut self, manifest: Manifest) -> Option<Manifest> {
        debug_assert_eq!(manifest.repo_id(), self.id);
        self.manifests.insert(manifest.registry(), manifest)
    }
}
