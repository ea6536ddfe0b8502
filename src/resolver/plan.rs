// src/resolver/plan.rs

//! Migration planning
//!
//! Given one or more target repos, the planner emits their transitive
//! dependents in waves. A repo appears in a wave only once every impacted
//! repo it depends on (directly or not) has appeared in an earlier wave, so
//! diamond dependencies are ordered correctly.
//!
//! The plan is a pull-based iterator: each call to `next` computes exactly
//! one wave. A graph cycle among impacted repos stalls the frontier; that is
//! reported as [`Error::CyclicDependency`] instead of looping forever. A
//! target that sits on a cycle never migrates as a dependent, so a cycle
//! through a target stalls the same way.

use std::collections::HashSet;
use tracing::debug;

use super::graph::RepoGraph;
use crate::error::{Error, Result};
use crate::repo::Repo;

/// Dependents of one frontier repo that can migrate now
#[derive(Debug, Clone)]
pub struct NextMigration<'g> {
    pub migrateable: Vec<&'g Repo>,
    /// False when some direct dependent is still waiting on an impacted dependency
    pub fully_resolved: bool,
}

/// One batch of repos that are safe to migrate together
#[derive(Debug, Clone)]
pub struct Wave<'g> {
    pub step: usize,
    /// Ordered by repo id
    pub dependents: Vec<&'g Repo>,
    pub done: bool,
}

pub struct MigrationPlanner<'g> {
    graph: &'g RepoGraph,
    targets: Vec<&'g Repo>,
    impacted: Vec<&'g Repo>,
    impacted_ids: HashSet<&'g str>,
    directly_impacted: Vec<&'g Repo>,
    /// Targets that depend, directly or not, on one of their own dependents
    cyclic_targets: HashSet<&'g str>,
}

impl<'g> MigrationPlanner<'g> {
    /// Resolve target names through the graph and prepare a planner
    ///
    /// An unresolvable or ambiguous name fails with
    /// [`Error::AmbiguousRepo`], untouched.
    pub fn new<S: AsRef<str>>(graph: &'g RepoGraph, targets: &[S]) -> Result<Self> {
        let targets = targets
            .iter()
            .map(|name| graph.find_one(name.as_ref()).map_err(Error::from))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_repos(graph, targets))
    }

    /// Prepare a planner for already resolved targets
    pub fn from_repos(graph: &'g RepoGraph, targets: Vec<&'g Repo>) -> Self {
        let mut targets = targets;
        let mut seen = HashSet::new();
        targets.retain(|repo| seen.insert(repo.id()));

        let impacted = union(targets.iter().map(|t| graph.dependents(t)));
        let directly_impacted = union(targets.iter().map(|t| graph.direct_dependents(t)));
        let impacted_ids = impacted.iter().map(|repo| repo.id()).collect();
        let cyclic_targets = targets
            .iter()
            .filter(|target| {
                let dependents: HashSet<&str> =
                    graph.dependents(target).iter().map(|repo| repo.id()).collect();
                graph
                    .dependencies(target)
                    .iter()
                    .any(|dependency| dependents.contains(dependency.id()))
            })
            .map(|target| target.id())
            .collect::<HashSet<_>>();
        for id in &cyclic_targets {
            debug!("Target {} is part of a dependency cycle", id);
        }

        debug!(
            "Planning for {} target(s): {} impacted, {} directly",
            targets.len(),
            impacted.len(),
            directly_impacted.len()
        );

        Self {
            graph,
            targets,
            impacted,
            impacted_ids,
            directly_impacted,
            cyclic_targets,
        }
    }

    pub fn graph(&self) -> &'g RepoGraph {
        self.graph
    }

    pub fn targets(&self) -> &[&'g Repo] {
        &self.targets
    }

    /// Every transitive dependent of any target
    pub fn impacted(&self) -> &[&'g Repo] {
        &self.impacted
    }

    /// Every direct dependent of any target
    pub fn directly_impacted(&self) -> &[&'g Repo] {
        &self.directly_impacted
    }

    pub fn is_impacted(&self, repo: &Repo) -> bool {
        self.impacted_ids.contains(repo.id())
    }

    /// Which direct dependents of `frontier` can migrate given `completed`
    ///
    /// A dependent is migrateable once none of its transitive dependencies
    /// is an impacted repo that has not completed yet. A target on a cycle
    /// is never migrateable.
    pub fn plan_next(&self, frontier: &Repo, completed: &HashSet<&str>) -> NextMigration<'g> {
        let remaining: Vec<&'g Repo> = self
            .graph
            .direct_dependents(frontier)
            .into_iter()
            .filter(|repo| !completed.contains(repo.id()))
            .collect();

        let migrateable: Vec<&'g Repo> = remaining
            .iter()
            .copied()
            .filter(|candidate| !self.cyclic_targets.contains(candidate.id()))
            .filter(|candidate| {
                !self.graph.dependencies(candidate).iter().any(|dependency| {
                    self.is_impacted(dependency) && !completed.contains(dependency.id())
                })
            })
            .collect();

        NextMigration {
            fully_resolved: migrateable.len() == remaining.len(),
            migrateable,
        }
    }

    /// Start a fresh plan; every call re-derives from scratch
    pub fn plan(&self) -> Plan<'_, 'g> {
        Plan {
            planner: self,
            completed: HashSet::new(),
            frontier: self.targets.clone(),
            step: 0,
            finished: false,
        }
    }
}

/// Lazy sequence of migration waves
pub struct Plan<'p, 'g> {
    planner: &'p MigrationPlanner<'g>,
    completed: HashSet<&'g str>,
    frontier: Vec<&'g Repo>,
    step: usize,
    finished: bool,
}

impl<'g> Iterator for Plan<'_, 'g> {
    type Item = Result<Wave<'g>>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished && !self.frontier.is_empty() {
            self.step += 1;
            let mut migration: Vec<&'g Repo> = Vec::new();
            let mut retry: Vec<&'g Repo> = Vec::new();

            for &repo in &self.frontier {
                let next = self.planner.plan_next(repo, &self.completed);
                for dependent in next.migrateable {
                    if !migration.iter().any(|m| m.id() == dependent.id()) {
                        migration.push(dependent);
                    }
                }
                if !next.fully_resolved {
                    retry.push(repo);
                }
            }

            if migration.is_empty() {
                if retry.is_empty() {
                    self.frontier.clear();
                    continue;
                }
                // Something is still blocked and nothing moved: only a cycle does that
                self.finished = true;
                let mut stalled: Vec<String> = retry.iter().map(|r| r.id().to_string()).collect();
                stalled.sort();
                return Some(Err(Error::CyclicDependency {
                    step: self.step,
                    stalled,
                }));
            }

            migration.sort_by(|a, b| a.id().cmp(b.id()));
            self.completed.extend(migration.iter().map(|repo| repo.id()));

            let mut next_frontier = migration.clone();
            for repo in retry {
                if !next_frontier.iter().any(|r| r.id() == repo.id()) {
                    next_frontier.push(repo);
                }
            }
            self.frontier = next_frontier;

            debug!("Step {}: {} repo(s) to migrate", self.step, migration.len());
            return Some(Ok(Wave {
                step: self.step,
                dependents: migration,
                done: self.frontier.is_empty(),
            }));
        }
        None
    }
}

impl std::iter::FusedIterator for Plan<'_, '_> {}

/// Merge query results, keeping the first occurrence of each repo id
fn union<'g>(sets: impl Iterator<Item = Vec<&'g Repo>>) -> Vec<&'g Repo> {
    let mut seen = HashSet::new();
    sets.flatten().filter(|repo| seen.insert(repo.id())).collect()
}
