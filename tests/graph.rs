// tests/graph.rs

//! Graph query tests: dependents, dependencies, matching and name lookup.

mod common;

use common::{bower, graph, ids};
use ripple::{Dependency, Manifest, Registry, RepoGraph};

#[test]
fn test_no_repo_is_its_own_dependent() {
    let g = graph(&[
        ("a", &["c"]),
        ("b", &["a"]),
        ("c", &["b"]),
        ("d", &["d", "a"]),
    ]);
    for repo in g.repos() {
        assert!(g.dependents(repo).iter().all(|r| r.id() != repo.id()));
        assert!(g.dependencies(repo).iter().all(|r| r.id() != repo.id()));
    }
}

#[test]
fn test_transitive_covers_direct() {
    let g = graph(&[
        ("a", &[]),
        ("b", &["a"]),
        ("c", &["a", "b"]),
        ("d", &["c"]),
        ("e", &[]),
    ]);
    for repo in g.repos() {
        let all = ids(g.dependents(repo));
        for direct in g.direct_dependents(repo) {
            assert!(all.contains(&direct.id()));
        }
        let all = ids(g.dependencies(repo));
        for direct in g.direct_dependencies(repo) {
            assert!(all.contains(&direct.id()));
        }
    }

    let a = g.get("org/a").unwrap();
    assert_eq!(ids(g.dependents(a)), ["org/b", "org/c", "org/d"]);
    let d = g.get("org/d").unwrap();
    assert_eq!(ids(g.dependencies(d)), ["org/a", "org/b", "org/c"]);
}

#[test]
fn test_cycles_terminate() {
    let g = graph(&[("a", &["c"]), ("b", &["a"]), ("c", &["b"])]);
    let a = g.get("org/a").unwrap();
    assert_eq!(ids(g.dependents(a)), ["org/b", "org/c"]);
    assert_eq!(ids(g.dependencies(a)), ["org/b", "org/c"]);
}

#[test]
fn test_git_reference_matches_only_named_repo() {
    let g = RepoGraph::from_manifests([
        Manifest::new("org/a", Registry::Npm, Some("a".to_string()), ""),
        Manifest::new("org/ab", Registry::Npm, Some("ab".to_string()), ""),
        Manifest::new("other/a", Registry::Npm, Some("ignored".to_string()), ""),
        Manifest::new("org/app", Registry::Npm, Some("app".to_string()), "")
            .with_dependency("ignored", "git+ssh://h:org/a.git#v1"),
    ]);
    let app = g.get("org/app").unwrap();
    assert_eq!(ids(g.direct_dependencies(app)), ["org/a"]);
}

#[test]
fn test_source_reference_forms() {
    let repo_graph = RepoGraph::from_manifests([Manifest::new(
        "Financial-Times/o-table",
        Registry::Bower,
        Some("o-table".to_string()),
        "",
    )]);
    let repo = repo_graph.get("Financial-Times/o-table").unwrap();

    for reference in [
        "git+ssh://git@github.com:Financial-Times/o-table.git#v1.0.0",
        "git://github.com/financial-times/o-table#semver:^5",
        "Financial-Times/o-table",
        "https://github.com/Financial-Times/o-table.git",
    ] {
        let dep = Dependency::new("whatever", reference, Registry::Bower);
        assert!(ripple::resolver::matches(repo, &dep), "{reference} should match");
    }

    for reference in [
        "Financial-Times/o-table-extra",
        "Financial-Times/o-tables.git",
        "someone/Financial-Times-o-table",
    ] {
        let dep = Dependency::new("o-table", reference, Registry::Bower);
        assert!(!ripple::resolver::matches(repo, &dep), "{reference} should not match");
    }

    // Same reference from the other registry
    let dep = Dependency::new("o-table", "Financial-Times/o-table", Registry::Npm);
    assert!(!ripple::resolver::matches(repo, &dep));
}

#[test]
fn test_registries_do_not_cross() {
    let g = RepoGraph::from_manifests([
        Manifest::new("org/a", Registry::Npm, Some("a".to_string()), ""),
        bower("b", &["a"]),
    ]);
    let a = g.get("org/a").unwrap();
    assert!(g.direct_dependents(a).is_empty());
}

#[test]
fn test_latest_matches_by_name() {
    let g = RepoGraph::from_manifests([
        bower("a", &[]),
        Manifest::new("org/b", Registry::Bower, Some("b".to_string()), "")
            .with_dependency("a", "latest"),
    ]);
    let a = g.get("org/a").unwrap();
    assert_eq!(ids(g.direct_dependents(a)), ["org/b"]);
}

#[test]
fn test_find_one_reports_every_candidate() {
    let g = RepoGraph::from_manifests([
        bower("a", &[]),
        Manifest::new("fork/a", Registry::Bower, Some("a-fork".to_string()), ""),
    ]);

    let ambiguous = g.find_one("a").unwrap_err();
    assert_eq!(ambiguous.query, "a");
    assert_eq!(ambiguous.candidates, ["org/a", "fork/a"]);

    assert_eq!(g.find_one("fork/a").unwrap().id(), "fork/a");
    assert!(g.find_one("nope").unwrap_err().is_missing());
}

#[test]
fn test_find_one_by_registry_name() {
    let g = RepoGraph::from_manifests([
        bower("a", &[]),
        Manifest::new("org/a", Registry::Npm, Some("@scope/a".to_string()), ""),
    ]);
    assert_eq!(
        g.find_one_by_registry_name("@scope/a", Registry::Npm).unwrap().id(),
        "org/a"
    );
    assert!(g.find_one_by_registry_name("@scope/a", Registry::Bower).is_err());
}
