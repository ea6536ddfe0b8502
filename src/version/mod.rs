// src/version/mod.rs

//! Version range detection for declared dependencies
//!
//! A dependency's version string is either a semver version/range, which
//! means "whatever is published under this name", or a source reference
//! such as a git URL or `org/repo` shorthand, which names a repository
//! directly. npm range syntax is wider than what `semver::VersionReq`
//! accepts (`||` alternatives, hyphen ranges, space separated comparators,
//! partial versions), so anything the crate rejects is checked against the
//! npm grammar here.

use semver::{Version, VersionReq};

/// The npm dist-tag that stands in for "newest published version"
pub const LATEST_TAG: &str = "latest";

/// Comparator operators, longest first so `>=` wins over `>`
const OPERATORS: [&str; 8] = [">=", "<=", "~>", ">", "<", "=", "~", "^"];

/// Check whether a declared version string is a version or version range
///
/// Returns false for source references (`git+ssh://...`, `org/name#v1`,
/// `file:../x`) and for dist-tags such as `latest`.
pub fn is_version_range(spec: &str) -> bool {
    let spec = spec.trim();
    if spec.is_empty() || spec == "*" {
        return true;
    }
    if VersionReq::parse(spec).is_ok() {
        return true;
    }

    spec.split("||").all(|set| is_range_set(set.trim()))
}

/// One `||` alternative: a hyphen range or space separated comparators
fn is_range_set(set: &str) -> bool {
    if set.is_empty() {
        return true;
    }

    if let Some((low, high)) = set.split_once(" - ") {
        return is_partial_version(low.trim()) && is_partial_version(high.trim());
    }

    let mut tokens = set.split_whitespace();
    while let Some(token) = tokens.next() {
        // ">= 1.2.3" is legal npm syntax
        let comparator = if OPERATORS.contains(&token) {
            match tokens.next() {
                Some(operand) => format!("{token}{operand}"),
                None => return false,
            }
        } else {
            token.to_string()
        };

        if !is_comparator(&comparator) {
            return false;
        }
    }
    true
}

fn is_comparator(comparator: &str) -> bool {
    let operand = OPERATORS
        .iter()
        .find_map(|op| comparator.strip_prefix(op))
        .unwrap_or(comparator);
    is_partial_version(operand)
}

/// A full semver version, or 1-3 numeric/wildcard parts such as `1.x`
fn is_partial_version(version: &str) -> bool {
    let version = version.trim_start_matches(['v', '=']);
    if version.is_empty() {
        return false;
    }
    if Version::parse(version).is_ok() {
        return true;
    }
    // Prerelease or build metadata needs a complete core version
    if version.contains(['-', '+']) {
        return false;
    }

    let parts: Vec<&str> = version.split('.').collect();
    parts.len() <= 3
        && parts.iter().all(|part| {
            matches!(*part, "x" | "X" | "*")
                || (!part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
        })
}
