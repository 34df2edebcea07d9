//! Path exploration driver and suite explorer
//!
//! End-to-end runs over local-search-only configurations: flipping
//! branches, query reduction, ranking, budgets, caching and suites.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use dse_engine::config::{DseConfig, Preset, RankingPolicy};
use dse_engine::features::exploration::domain::IndividualsBudget;
use dse_engine::features::exploration::{Driver, ExplorationTask, SuiteExplorer};
use dse_engine::features::symbolic::{BranchLocation, Constraint, Expression};
use dse_engine::DseError;
use std::sync::Arc;

fn x() -> Expression {
    int_var("x", 5)
}

fn y() -> Expression {
    int_var("y", 1)
}

// ═══════════════════════════════════════════════════════════════════════════
// Single path
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_end_to_end_flip() {
    // x < 0 not taken, x == 5 taken
    let path = PathBuilder::new("m")
        .branch(Constraint::lt(x(), Expression::int(0)), false)
        .branch(Constraint::eq(x(), Expression::int(5)), true)
        .build();
    let input = int_input("case", &[("x", 5)]);

    assert_eq!(
        Driver::reduced_query(&path, 1).unwrap(),
        vec![
            Constraint::ge(x(), Expression::int(0)),
            Constraint::ne(x(), Expression::int(5)),
        ]
    );

    let mut driver = Driver::new(local_only_config()).unwrap();
    let report = driver.explore(&input, &path).await;

    let second = assert_generated_for(&report, &BranchLocation::new("m", 2));
    let v = int_slot(second, "x");
    assert!(v >= 0 && v != 5, "x = {v}");
    assert_eq!(
        second.expected_prefix,
        vec![(BranchLocation::new("m", 1), false), (BranchLocation::new("m", 2), false)]
    );

    let first = assert_generated_for(&report, &BranchLocation::new("m", 1));
    assert!(int_slot(first, "x") < 0);
    assert!(first.polarity);

    assert_eq!(report.stats.successes, 2);
    assert_eq!(report.stats.failures, 0);
    assert_eq!(report.stats.success_rate(), 1.0);
}

#[test]
fn test_cone_of_influence_drops_unrelated() {
    // c1(x), c2(y), c3(x) with c3 as target
    let c1 = Constraint::gt(x(), Expression::int(0));
    let c2 = Constraint::gt(y(), Expression::int(0));
    let c3 = Constraint::lt(x(), Expression::int(10));
    let path = PathBuilder::new("m")
        .branch(c1.clone(), true)
        .branch(c2.clone(), true)
        .branch(c3.clone(), true)
        .build();

    let reduced = Driver::reduced_query(&path, 2).unwrap();
    assert!(reduced.contains(&c1));
    assert!(reduced.contains(&c3.negate()));
    assert!(!reduced.contains(&c2));
    assert!(Driver::reduced_query(&path, 3).is_none());
}

#[tokio::test]
async fn test_covered_polarity_not_regenerated() {
    let path = PathBuilder::new("m")
        .branch(Constraint::eq(x(), Expression::int(5)), true)
        .build();
    let input = int_input("case", &[("x", 5)]);
    let mut driver = Driver::new(local_only_config()).unwrap();

    let first = driver.explore(&input, &path).await;
    assert_eq!(first.generated.len(), 1);

    let second = driver.explore(&input, &path).await;
    assert!(second.generated.is_empty());
    assert_eq!(second.stats.attempts, 0);
    assert_eq!(driver.stats().successes, 1);
}

#[tokio::test]
async fn test_ranked_skips_locations_with_both_polarities() {
    // loop header at m@1 seen taken and not taken
    let mut path = PathBuilder::new("m")
        .branch(Constraint::lt(x(), Expression::int(10)), true)
        .build();
    path.push(dse_engine::features::symbolic::BranchCondition::new(
        BranchLocation::new("m", 1),
        Constraint::lt(x(), Expression::int(6)),
        false,
    ));
    let input = int_input("case", &[("x", 5)]);
    let config = DseConfig::preset(Preset::Fast)
        .solver(|c| c.no_executable())
        .local_search(|c| c.seed(1))
        .exploration(|c| c.ranking(RankingPolicy::Ranked))
        .build()
        .unwrap();

    let report = Driver::new(config).unwrap().explore(&input, &path).await;
    assert!(report.generated.is_empty());
    assert_eq!(report.stats.attempts, 0);
}

#[tokio::test]
async fn test_query_cache_answers_repeated_query() {
    let config = DseConfig::preset(Preset::Fast)
        .solver(|c| c.no_executable())
        .local_search(|c| c.seed(1))
        .exploration(|c| c.ranking(RankingPolicy::NegateAllInOrder))
        .build()
        .unwrap();
    assert!(config.exploration().skip_seen_paths);
    let mut driver = Driver::new(config).unwrap();
    let input = int_input("case", &[("x", 5)]);

    for method in ["a", "b"] {
        let path = PathBuilder::new(method)
            .branch(Constraint::eq(x(), Expression::int(5)), true)
            .build();
        let report = driver.explore(&input, &path).await;
        assert_eq!(report.generated.len(), 1);
    }
    assert_eq!(driver.stats().cache_hits, 1);
    assert_eq!(driver.stats().local_search_calls, 1);
}

#[tokio::test]
async fn test_seen_query_skipped() {
    let config = DseConfig::preset(Preset::Fast)
        .solver(|c| c.no_executable())
        .local_search(|c| c.seed(7))
        .exploration(|c| c.ranking(RankingPolicy::NegateAllInOrder).query_cache_capacity(0))
        .build()
        .unwrap();
    let mut driver = Driver::new(config).unwrap();
    let input = int_input("case", &[("x", 5)]);

    for method in ["a", "b"] {
        let path = PathBuilder::new(method)
            .branch(Constraint::eq(x(), Expression::int(5)), true)
            .build();
        driver.explore(&input, &path).await;
    }
    assert_eq!(driver.stats().skipped_seen, 1);
    assert_eq!(driver.stats().successes, 1);
}

#[tokio::test]
async fn test_failed_branch_retried_up_to_bound() {
    // x * x == 2 has no integer solution, so every attempt exhausts
    let path = PathBuilder::new("m")
        .branch(Constraint::eq(x().mul(x()), Expression::int(2)), false)
        .build();
    let input = int_input("case", &[("x", 5)]);
    let config = DseConfig::preset(Preset::Balanced)
        .solver(|c| c.no_executable())
        .local_search(|c| c.seed(3).max_evaluations(2_000).max_restarts(1))
        .build()
        .unwrap();
    let bound = config.exploration().max_attempts_per_branch;
    assert_eq!(bound, 3);
    assert!(config.exploration().skip_seen_paths);

    let mut driver = Driver::new(config).unwrap();
    let failing = BranchLocation::new("m", 1);
    for _ in 0..bound {
        let report = driver.explore(&input, &path).await;
        assert!(report.generated.is_empty());
    }
    assert_eq!(driver.attempts_at(&failing), bound);
    assert_eq!(driver.stats().skipped_seen, 0);
    assert_eq!(driver.stats().local_search_exhausted, u64::from(bound));

    let last = driver.explore(&input, &path).await;
    assert_eq!(last.stats.skipped_retry_bound, 1);
    assert_eq!(last.stats.attempts, 0);
}

#[tokio::test]
async fn test_individuals_budget_stops_exploration() {
    let path = PathBuilder::new("m")
        .branch(Constraint::lt(x(), Expression::int(0)), false)
        .branch(Constraint::eq(x(), Expression::int(5)), true)
        .branch(Constraint::gt(x(), Expression::int(100)), false)
        .build();
    let input = int_input("case", &[("x", 5)]);
    let budget = Arc::new(IndividualsBudget::new(1));
    let mut driver = Driver::new(local_only_config())
        .unwrap()
        .with_budget(budget.clone());

    let report = driver.explore(&input, &path).await;
    assert_eq!(report.generated.len(), 1);
    assert_eq!(budget.produced(), 1);
}

#[test]
fn test_unreachable_solver_fails_fast() {
    let config = DseConfig::preset(Preset::Fast)
        .solver(|c| c.executable("/nonexistent/solver/z3"))
        .build()
        .unwrap();
    assert!(matches!(
        Driver::new(config),
        Err(DseError::Misconfiguration(_))
    ));
}

// ═══════════════════════════════════════════════════════════════════════════
// Suites
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_suite_from_json_preserves_order() {
    let json = r#"[
        {
            "input": {"name": "first", "slots": {"x": {"type": "int", "value": 5}}},
            "path_condition": [{
                "location": {"method": "m", "instruction_index": 1},
                "constraint": {
                    "left": {"kind": "var", "name": "x", "domain": {"sort": "integer", "min": -2147483648, "max": 2147483647}, "concrete": 5},
                    "comparator": "eq",
                    "right": {"kind": "int", "value": 5}
                },
                "taken": true
            }]
        },
        {
            "input": {"name": "second", "slots": {"x": {"type": "int", "value": 3}}},
            "path_condition": [{
                "location": {"method": "n", "instruction_index": 7},
                "constraint": {
                    "left": {"kind": "var", "name": "x", "domain": {"sort": "integer", "min": -2147483648, "max": 2147483647}, "concrete": 3},
                    "comparator": "gt",
                    "right": {"kind": "int", "value": 10}
                },
                "taken": false
            }]
        }
    ]"#;
    let tasks: Vec<ExplorationTask> = serde_json::from_str(json).unwrap();

    let suite = SuiteExplorer::new(local_only_config())
        .unwrap()
        .with_max_concurrency(2);
    let report = suite.explore_all(tasks).await;

    assert_eq!(report.reports.len(), 2);
    assert_eq!(report.generated_count(), 2);
    assert_eq!(report.reports[0].generated[0].input.name, "first");
    assert_eq!(report.reports[1].generated[0].target, BranchLocation::new("n", 7));
    assert!(int_slot(&report.reports[1].generated[0], "x") > 10);
    assert_eq!(report.stats.successes, 2);
}

#[tokio::test]
async fn test_cancelled_suite_generates_nothing() {
    let tasks = vec![ExplorationTask {
        input: int_input("case", &[("x", 5)]),
        path_condition: PathBuilder::new("m")
            .branch(Constraint::eq(x(), Expression::int(5)), true)
            .build(),
    }];
    let suite = SuiteExplorer::new(local_only_config()).unwrap();
    suite.cancellation_token().cancel();

    let report = suite.explore_all(tasks).await;
    assert_eq!(report.generated_count(), 0);
    assert_eq!(report.stats.attempts, 0);
}
