// src/normaliser/conflicts.rs

//! Declared-name conflicts
//!
//! Forks, renames and copy-pasted manifests leave several repositories
//! declaring the same package name in one registry. Left alone, every
//! dependency on that name would match all of them. Each group is settled
//! by a precedence cascade; the first step that leaves exactly one manifest
//! picks the winner:
//!
//! 1. the source URL names the manifest's own repo
//! 2. the repo name contains the declared name (last path segment of each)
//! 3. the repo name equals the declared name
//!
//! Only step 1 ignores case; names are compared exactly.
//!
//! Losers get a placeholder name. A group without a winner is reported when
//! something depends on the name and passed through silently otherwise.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{NormaliseReport, Rename, RenameReason};
use crate::manifest::{Manifest, trailing_segment};
use crate::registry::Registry;

/// Several repos declare one name and none can be preferred
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConflict {
    pub registry: Registry,
    pub name: String,
    /// Repos declaring the name
    pub repo_ids: Vec<String>,
    /// Repos depending on the name
    pub required_by: Vec<String>,
}

impl fmt::Display for NamingConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} name \"{}\" is declared by {} and required by {}",
            self.registry,
            self.name,
            self.repo_ids.join(", "),
            self.required_by.join(", ")
        )
    }
}

/// A fresh name that no dependency can match
pub(crate) fn placeholder_name() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Settle every group of manifests sharing `(registry, declared name)`
pub(crate) fn resolve_conflicts(manifests: &mut [Manifest], report: &mut NormaliseReport) {
    let mut groups: BTreeMap<(Registry, String), Vec<usize>> = BTreeMap::new();
    for (i, manifest) in manifests.iter().enumerate() {
        if let Some(name) = manifest.declared_name() {
            groups
                .entry((manifest.registry(), name.to_string()))
                .or_default()
                .push(i);
        }
    }

    for ((registry, name), group) in groups {
        if group.len() < 2 {
            continue;
        }

        match pick_winner(manifests, &group, &name) {
            Some(winner) => {
                let winner_id = manifests[winner].repo_id().to_string();
                info!(
                    "Resolved {} name conflict on \"{}\" in favour of {}",
                    registry, name, winner_id
                );
                for &loser in group.iter().filter(|&&i| i != winner) {
                    let placeholder = placeholder_name();
                    info!(
                        "Renaming {} {} from \"{}\" to \"{}\"",
                        registry,
                        manifests[loser].repo_id(),
                        name,
                        placeholder
                    );
                    manifests[loser].rename(placeholder.clone());
                    report.renames.push(Rename {
                        repo_id: manifests[loser].repo_id().to_string(),
                        registry,
                        from: name.clone(),
                        to: placeholder,
                        reason: RenameReason::ConflictLoser {
                            winner: winner_id.clone(),
                        },
                    });
                }
            }
            None => {
                let repo_ids: Vec<String> = group
                    .iter()
                    .map(|&i| manifests[i].repo_id().to_string())
                    .collect();
                let required_by = required_by(manifests, &group);

                if required_by.is_empty() {
                    debug!(
                        "Ignoring unused {} name \"{}\" shared by {}",
                        registry,
                        name,
                        repo_ids.join(", ")
                    );
                    continue;
                }

                let conflict = NamingConflict {
                    registry,
                    name,
                    repo_ids,
                    required_by,
                };
                warn!("Unresolved naming conflict: {}", conflict);
                report.conflicts.push(conflict);
            }
        }
    }
}

fn pick_winner(manifests: &[Manifest], group: &[usize], name: &str) -> Option<usize> {
    let wanted = trailing_segment(name);

    let steps: [&dyn Fn(&Manifest) -> bool; 3] = [
        &|m: &Manifest| {
            m.source_url()
                .to_lowercase()
                .contains(&m.repo_id().to_lowercase())
        },
        &|m: &Manifest| trailing_segment(m.repo_id()).contains(wanted),
        &|m: &Manifest| trailing_segment(m.repo_id()) == wanted,
    ];

    steps.iter().find_map(|step| {
        let survivors: Vec<usize> = group
            .iter()
            .copied()
            .filter(|&i| step(&manifests[i]))
            .collect();
        match survivors.as_slice() {
            [winner] => Some(*winner),
            _ => None,
        }
    })
}

/// Ids of repos outside `group` that depend on the group's name, sorted
fn required_by(manifests: &[Manifest], group: &[usize]) -> Vec<String> {
    let Some(&first) = group.first() else {
        return Vec::new();
    };
    let named = &manifests[first];

    manifests
        .iter()
        .enumerate()
        .filter(|(i, _)| !group.contains(i))
        .filter(|(_, m)| m.dependencies().iter().any(|dep| named.is_referenced_by(dep)))
        .map(|(_, m)| m.repo_id().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
