// tests/planner.rs

//! Migration planning tests: chains, diamonds, multiple targets and cycles.

mod common;

use common::{graph, wave, waves};
use ripple::{Error, MigrationPlanner};

#[test]
fn test_linear_chain() {
    let g = graph(&[("a", &[]), ("b", &["a"]), ("c", &["b"])]);
    let planner = MigrationPlanner::new(&g, &["a"]).unwrap();
    assert_eq!(waves(&planner), [wave(&["b"]), wave(&["c"])]);
}

#[test]
fn test_diamond_waits_for_every_impacted_dependency() {
    let g = graph(&[
        ("a", &[]),
        ("b", &["a"]),
        ("c", &["a", "b"]),
        ("d", &["a", "b", "c"]),
    ]);
    let planner = MigrationPlanner::new(&g, &["a"]).unwrap();
    assert_eq!(waves(&planner), [wave(&["b"]), wave(&["c"]), wave(&["d"])]);
}

#[test]
fn test_independent_targets_advance_together() {
    let g = graph(&[
        ("a", &[]),
        ("b", &["a"]),
        ("c", &["b"]),
        ("x", &[]),
        ("y", &["x"]),
        ("z", &["y"]),
    ]);
    let planner = MigrationPlanner::new(&g, &["a", "x"]).unwrap();
    assert_eq!(waves(&planner), [wave(&["b", "y"]), wave(&["c", "z"])]);
}

#[test]
fn test_nested_dependents() {
    let g = graph(&[
        ("a", &[]),
        ("b", &["a"]),
        ("c", &["b", "e"]),
        ("d", &["b"]),
        ("e", &["a", "d"]),
        ("f", &["c"]),
        ("g", &["f"]),
        ("h", &["g"]),
        ("i", &["a", "d"]),
        ("j", &["a", "f", "i"]),
    ]);
    let planner = MigrationPlanner::new(&g, &["a"]).unwrap();

    assert_eq!(
        waves(&planner),
        [
            wave(&["b"]),
            wave(&["d"]),
            wave(&["e", "i"]),
            wave(&["c"]),
            wave(&["f"]),
            wave(&["g", "j"]),
            wave(&["h"]),
        ]
    );
    assert_eq!(planner.impacted().len(), 9);
}

#[test]
fn test_steps_are_numbered_from_one() {
    let g = graph(&[("a", &[]), ("b", &["a"]), ("c", &["b"])]);
    let planner = MigrationPlanner::new(&g, &["a"]).unwrap();
    let steps: Vec<usize> = planner.plan().map(|w| w.unwrap().step).collect();
    assert_eq!(steps, [1, 2]);
}

#[test]
fn test_plan_is_deterministic_and_restartable() {
    let g = graph(&[
        ("a", &[]),
        ("b", &["a"]),
        ("c", &["a"]),
        ("d", &["b", "c"]),
        ("e", &["d"]),
    ]);
    let planner = MigrationPlanner::new(&g, &["a"]).unwrap();
    let first = waves(&planner);
    for _ in 0..5 {
        assert_eq!(waves(&planner), first);
    }
    let again = MigrationPlanner::new(&g, &["a"]).unwrap();
    assert_eq!(waves(&again), first);
}

#[test]
fn test_plan_is_lazy() {
    let g = graph(&[("a", &[]), ("b", &["a"]), ("c", &["b"]), ("d", &["c"])]);
    let planner = MigrationPlanner::new(&g, &["a"]).unwrap();
    let mut plan = planner.plan();

    let first = plan.next().unwrap().unwrap();
    assert_eq!(first.dependents[0].short_name(), "b");
    // Dropping the plan part way is fine; a new one starts over
    drop(plan);
    let restarted = planner.plan().next().unwrap().unwrap();
    assert_eq!(restarted.step, 1);
}

#[test]
fn test_nothing_to_migrate() {
    let g = graph(&[("a", &[]), ("b", &[])]);
    let planner = MigrationPlanner::new(&g, &["a"]).unwrap();
    assert!(waves(&planner).is_empty());
    assert!(planner.impacted().is_empty());
}

#[test]
fn test_cycle_is_reported() {
    let g = graph(&[("a", &[]), ("b", &["a", "c"]), ("c", &["b"])]);
    let planner = MigrationPlanner::new(&g, &["a"]).unwrap();
    let results: Vec<_> = planner.plan().collect();

    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(Error::CyclicDependency { .. })));
}

#[test]
fn test_cycle_after_progress() {
    // b migrates first, then d and e wait on each other
    let g = graph(&[
        ("a", &[]),
        ("b", &["a"]),
        ("d", &["b", "e"]),
        ("e", &["b", "d"]),
    ]);
    let planner = MigrationPlanner::new(&g, &["a"]).unwrap();
    let mut plan = planner.plan();

    let first = plan.next().unwrap().unwrap();
    assert_eq!(first.dependents[0].short_name(), "b");
    match plan.next() {
        Some(Err(Error::CyclicDependency { step, stalled })) => {
            assert_eq!(step, 2);
            assert_eq!(stalled, ["org/b"]);
        }
        other => panic!("expected cyclic dependency, got {other:?}"),
    }
    assert!(plan.next().is_none());
}

#[test]
fn test_cycle_through_target_is_reported() {
    let g = graph(&[("a", &["b"]), ("b", &["a"])]);
    let planner = MigrationPlanner::new(&g, &["a"]).unwrap();
    let results: Vec<_> = planner.plan().collect();

    // The target must never be scheduled after its own dependent
    for wave in results.iter().flatten() {
        assert!(wave.dependents.iter().all(|repo| repo.id() != "org/a"));
    }
    match results.last() {
        Some(Err(Error::CyclicDependency { step, stalled })) => {
            assert_eq!(*step, 2);
            assert_eq!(stalled, &["org/b"]);
        }
        other => panic!("expected cyclic dependency, got {other:?}"),
    }
}

#[test]
fn test_unknown_target() {
    let g = graph(&[("a", &[])]);
    match MigrationPlanner::new(&g, &["missing"]) {
        Err(Error::AmbiguousRepo(ambiguous)) => {
            assert!(ambiguous.is_missing());
            assert_eq!(ambiguous.query, "missing");
        }
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("expected an unresolved target"),
    }
}

#[test]
fn test_target_by_full_id() {
    let g = graph(&[("a", &[]), ("b", &["a"])]);
    let planner = MigrationPlanner::new(&g, &["org/a"]).unwrap();
    assert_eq!(planner.targets()[0].id(), "org/a");
    assert_eq!(waves(&planner), [wave(&["b"])]);
}
