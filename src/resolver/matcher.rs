// src/resolver/matcher.rs

//! Deciding whether a declared dependency refers to a repository
//!
//! Every graph query goes through [`matches`]. The rule is registry aware:
//! a dependency only ever matches a repo that publishes to the same
//! registry, by declared name for version ranges (and `latest`), and by
//! repository id for source references such as git URLs.

use crate::manifest::Dependency;
use crate::repo::Repo;

/// Does `dependency` refer to `repo`?
pub fn matches(repo: &Repo, dependency: &Dependency) -> bool {
    let Some(manifest) = repo.manifest(dependency.registry()) else {
        // Cross-registry dependencies never match
        return false;
    };

    match dependency.source_reference() {
        Some(reference) => reference_names_repo(reference, repo.id()),
        None => manifest.declared_name() == Some(dependency.name()),
    }
}

/// Whether a source reference points at `repo_id`
///
/// Case-insensitive. The id must appear as a whole token: at the start or
/// after a `/` or `:` (the end of a scheme/host prefix), and followed by the
/// end of the string, `.` (e.g. `.git`) or `#` (a committish).
pub fn reference_names_repo(reference: &str, repo_id: &str) -> bool {
    if repo_id.is_empty() {
        return false;
    }
    let reference = reference.to_lowercase();
    let repo_id = repo_id.to_lowercase();

    reference.match_indices(&repo_id).any(|(start, found)| {
        let before = reference[..start].chars().next_back();
        let after = reference[start + found.len()..].chars().next();
        matches!(before, None | Some('/' | ':')) && matches!(after, None | Some('.' | '#'))
    })
}
