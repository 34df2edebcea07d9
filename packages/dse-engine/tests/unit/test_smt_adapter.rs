//! SMT solver adapter against fake solver processes
//!
//! Each fake is a `/bin/sh` script in a temp directory standing in for
//! `z3 -smt2 -in`.

#![cfg(unix)]

#[path = "../common/mod.rs"]
mod common;

use common::*;
use dse_engine::config::SolverConfig;
use dse_engine::features::exploration::SolveChain;
use dse_engine::features::solver::infrastructure::render_query;
use dse_engine::features::solver::{ConstraintSolver, SmtSolver, SolverResult, UnknownReason};
use dse_engine::features::symbolic::{Constraint, Expression, Model, Value};
use dse_engine::DseError;
use std::fs;
use std::process::Command;
use std::time::{Duration, Instant};

fn solver_for(fake: &FakeSolver) -> SmtSolver {
    let config = SolverConfig::default()
        .executable(fake.path.clone())
        .args(Vec::<String>::new());
    SmtSolver::new(&config).expect("fake solver resolves")
}

fn x_equals(v: i64) -> Vec<Constraint> {
    vec![Constraint::eq(int_var("x", 0), Expression::int(v))]
}

// ═══════════════════════════════════════════════════════════════════════════
// Answers
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_sat_with_model() {
    let fake = answering_solver("sat\n(\n  (define-fun x () Int\n    (- 12))\n)");
    let result = solver_for(&fake)
        .solve(&x_equals(-12), Duration::from_secs(5))
        .await;
    let model = assert_sat(&result);
    assert_eq!(model.get("x"), Some(&Value::Int(-12)));
}

#[tokio::test]
async fn test_unsat_unknown_and_error() {
    let unsat = answering_solver("unsat");
    let result = solver_for(&unsat).solve(&x_equals(1), Duration::from_secs(5)).await;
    assert_eq!(result, SolverResult::Unsat);

    let unknown = answering_solver("unknown");
    let result = solver_for(&unknown).solve(&x_equals(1), Duration::from_secs(5)).await;
    assert_eq!(result, SolverResult::Unknown(UnknownReason::Incomplete));

    let error = answering_solver(r#"(error "line 1 column 2: invalid command")"#);
    let result = solver_for(&error).solve(&x_equals(1), Duration::from_secs(5)).await;
    assert_eq!(
        result,
        SolverResult::Error("line 1 column 2: invalid command".to_string())
    );
}

#[tokio::test]
async fn test_garbage_is_parse_error() {
    let fake = answering_solver("segmentation fault");
    let result = solver_for(&fake).solve(&x_equals(1), Duration::from_secs(5)).await;
    match result {
        SolverResult::ParseError { raw, .. } => assert!(raw.contains("segmentation fault")),
        other => panic!("Expected parse error, got: {other}"),
    }

    let empty = fake_solver("cat > /dev/null");
    let result = solver_for(&empty).solve(&x_equals(1), Duration::from_secs(5)).await;
    assert!(matches!(result, SolverResult::ParseError { .. }));
}

#[tokio::test]
async fn test_query_written_to_stdin() {
    let fake = fake_solver("cat > \"$(dirname \"$0\")/query.smt2\"\necho unsat");
    let constraints = x_equals(3);
    let result = solver_for(&fake).solve(&constraints, Duration::from_secs(5)).await;
    assert_eq!(result, SolverResult::Unsat);

    let received = fs::read_to_string(fake.dir.path().join("query.smt2")).unwrap();
    assert_eq!(received, render_query(&constraints, false).unwrap());
    assert!(received.contains("(declare-fun x () Int)"));
    assert!(received.contains("(check-sat)"));
}

// ═══════════════════════════════════════════════════════════════════════════
// Timeouts and configuration
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_timeout_kills_process() {
    let fake = hanging_solver();
    let started = Instant::now();
    let result = solver_for(&fake)
        .solve(&x_equals(1), Duration::from_millis(300))
        .await;

    assert_eq!(result, SolverResult::Unknown(UnknownReason::Timeout));
    assert!(started.elapsed() < Duration::from_secs(10));

    let pid = fs::read_to_string(fake.dir.path().join("pid")).unwrap();
    let alive = Command::new("kill")
        .args(["-0", pid.trim()])
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    assert!(!alive, "solver process {} still running", pid.trim());
}

#[test]
fn test_unresolvable_executable_is_misconfiguration() {
    let config = SolverConfig::default().executable("/nonexistent/dir/z3");
    assert!(matches!(
        SmtSolver::new(&config),
        Err(DseError::Misconfiguration(_))
    ));

    let config = SolverConfig::default().executable("definitely-not-a-solver-binary");
    assert!(matches!(
        SmtSolver::new(&config),
        Err(DseError::Misconfiguration(_))
    ));
}

// ═══════════════════════════════════════════════════════════════════════════
// Solve chain
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_unknown_falls_back_to_local_search() {
    let fake = answering_solver("unknown");
    let chain = SolveChain::from_config(&external_solver_config(&fake, true)).unwrap();
    assert!(chain.has_external_solver());

    let constraints = x_equals(42);
    let outcome = chain.solve(&constraints, &Model::new()).await;
    assert_eq!(outcome.solver_calls, 1);
    assert_eq!(outcome.local_search_calls, 1);
    assert_satisfies(assert_sat(&outcome.result), &constraints);
}

#[tokio::test]
async fn test_fallback_disabled_keeps_solver_answer() {
    let fake = answering_solver("unknown");
    let chain = SolveChain::from_config(&external_solver_config(&fake, false)).unwrap();

    let outcome = chain.solve(&x_equals(42), &Model::new()).await;
    assert_eq!(outcome.local_search_calls, 0);
    assert_eq!(outcome.result, SolverResult::Unknown(UnknownReason::Incomplete));
}

#[tokio::test]
async fn test_unsat_is_not_retried_locally() {
    let fake = answering_solver("unsat");
    let chain = SolveChain::from_config(&external_solver_config(&fake, true)).unwrap();

    let outcome = chain.solve(&x_equals(42), &Model::new()).await;
    assert_eq!(outcome.result, SolverResult::Unsat);
    assert_eq!(outcome.local_search_calls, 0);
}

#[tokio::test]
async fn test_non_linear_bypasses_solver() {
    let fake = answering_solver("unsat");
    let chain = SolveChain::from_config(&external_solver_config(&fake, true)).unwrap();

    // x * y == 12
    let constraints = vec![Constraint::eq(
        int_var("x", 1).mul(int_var("y", 1)),
        Expression::int(12),
    )];
    let outcome = chain.solve(&constraints, &Model::new()).await;
    assert_eq!(outcome.solver_calls, 0);
    assert_satisfies(assert_sat(&outcome.result), &constraints);
}
