// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use ripple::{Manifest, MigrationPlanner, Registry, RepoGraph};
use std::collections::BTreeSet;

/// A bower manifest for `org/{name}`, declaring `name` and depending on `deps` by name
pub fn bower(name: &str, deps: &[&str]) -> Manifest {
    deps.iter().fold(
        Manifest::new(format!("org/{name}"), Registry::Bower, Some(name.to_string()), ""),
        |manifest, dep| manifest.with_dependency(*dep, "^4.7.9"),
    )
}

/// Graph of bower repos given as `(name, dependencies)`
pub fn graph(repos: &[(&str, &[&str])]) -> RepoGraph {
    RepoGraph::from_manifests(repos.iter().map(|(name, deps)| bower(name, deps)))
}

/// Short names per wave; panics on a planning error
pub fn waves(planner: &MigrationPlanner<'_>) -> Vec<BTreeSet<String>> {
    planner
        .plan()
        .map(|wave| {
            wave.unwrap()
                .dependents
                .iter()
                .map(|repo| repo.short_name().to_string())
                .collect()
        })
        .collect()
}

/// Build an expected wave from short names
pub fn wave(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Ids of repos, sorted
pub fn ids<'a>(repos: impl IntoIterator<Item = &'a ripple::Repo>) -> Vec<&'a str> {
    let mut ids: Vec<&str> = repos.into_iter().map(|repo| repo.id()).collect();
    ids.sort_unstable();
    ids
}
