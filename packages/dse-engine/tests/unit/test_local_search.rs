//! Alternating Variable Method local search
//!
//! Covers convergence on integer, real and string variables, budget
//! exhaustion, and the distance functions guiding the search.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use dse_engine::config::LocalSearchConfig;
use dse_engine::features::local_search::infrastructure::{fitness, normalize, string_distance};
use dse_engine::features::local_search::{regex_distance, AvmSolver};
use dse_engine::features::solver::{ConstraintSolver, SolverResult, UnknownReason};
use dse_engine::features::symbolic::{
    Constraint, Expression, Model, StringPredicate, UnaryOp, Value, Variable,
};
use proptest::prelude::*;
use std::time::Duration;

fn avm(seed: u64) -> AvmSolver {
    AvmSolver::new(LocalSearchConfig::default().seed(seed))
}

const TIMEOUT: Duration = Duration::from_secs(10);

// ═══════════════════════════════════════════════════════════════════════════
// Integer search
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_integer_converges_exactly() {
    let v = Variable::long("v", 0);
    let constraints = vec![Constraint::eq(Expression::var(v.clone()), Expression::int(235_082))];
    let found = avm(1).search(&v, &constraints, 10_000);
    assert_eq!(found, Some(Value::Int(235_082)));
}

#[test]
fn test_integer_converges_on_large_int_constant() {
    let v = Variable::int("v", 0);
    for target in [50_000_000, 2_000_000_000, i64::from(i32::MAX)] {
        let constraints = vec![Constraint::eq(Expression::var(v.clone()), Expression::int(target))];
        assert_eq!(avm(1).search(&v, &constraints, 1_000_000), Some(Value::Int(target)));
        let model = assert_sat(&avm(1).solve_blocking(&constraints, TIMEOUT)).clone();
        assert_eq!(model.get("v"), Some(&Value::Int(target)));
    }
}

#[test]
fn test_linear_system_round_trip() {
    // 2x + y == 17, x > 3, y >= 0
    let x = int_var("x", 0);
    let y = int_var("y", 0);
    let constraints = vec![
        Constraint::eq(
            x.clone().mul(Expression::int(2)).add(y.clone()),
            Expression::int(17),
        ),
        Constraint::gt(x, Expression::int(3)),
        Constraint::ge(y, Expression::int(0)),
    ];
    let result = avm(3).solve_blocking(&constraints, TIMEOUT);
    assert_satisfies(assert_sat(&result), &constraints);
}

#[test]
fn test_byte_variable_stays_in_domain() {
    let b = Variable::byte("b", 0);
    let constraints = vec![Constraint::gt(Expression::var(b), Expression::int(200))];
    let result = avm(1).solve_blocking(&constraints, TIMEOUT);
    assert!(!result.is_sat());
}

#[test]
fn test_already_satisfied_returns_current_values() {
    let constraints = vec![Constraint::lt(int_var("x", 3), Expression::int(10))];
    let result = avm(1).solve_blocking(&constraints, TIMEOUT);
    assert_eq!(assert_sat(&result).get("x"), Some(&Value::Int(3)));
}

#[test]
fn test_variable_free_unsatisfied_is_unsat() {
    let constraints = vec![Constraint::eq(Expression::int(1), Expression::int(2))];
    assert_eq!(avm(1).solve_blocking(&constraints, TIMEOUT), SolverResult::Unsat);
}

#[test]
fn test_budget_exhaustion() {
    // x > 10 && x < 5 has no solution
    let x = int_var("x", 0);
    let constraints = vec![
        Constraint::gt(x.clone(), Expression::int(10)),
        Constraint::lt(x, Expression::int(5)),
    ];
    let solver = AvmSolver::new(
        LocalSearchConfig::default()
            .seed(2)
            .max_evaluations(2_000)
            .max_restarts(1),
    );
    assert_eq!(
        solver.solve_blocking(&constraints, TIMEOUT),
        SolverResult::Unknown(UnknownReason::LocalSearchExhausted)
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Reals and strings
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_real_converges_within_tolerance() {
    let d = Expression::var(Variable::double("d", 0.0));
    let constraints = vec![
        Constraint::ge(d.clone(), Expression::real(2.75)),
        Constraint::le(d, Expression::real(2.76)),
    ];
    let result = avm(4).solve_blocking(&constraints, TIMEOUT);
    let value = assert_sat(&result).get("d").and_then(Value::as_f64).unwrap();
    assert!((2.75..=2.76).contains(&value), "got {value}");
}

#[test]
fn test_string_equality() {
    let s = string_var("s", "cat");
    let equals = Expression::predicate(StringPredicate::Equals, s, Expression::string("dogs"));
    let constraints = vec![Constraint::ne(equals, Expression::int(0))];
    let result = avm(5).solve_blocking(&constraints, TIMEOUT);
    assert_eq!(
        assert_sat(&result).get("s"),
        Some(&Value::Str("dogs".to_string()))
    );
}

#[test]
fn test_string_length_and_case() {
    // upper(s).startsWith("AB") && length(s) == 4
    let s = string_var("s", "");
    let upper = Expression::unary(UnaryOp::ToUpperCase, s.clone());
    let starts = Expression::predicate(StringPredicate::StartsWith, upper, Expression::string("AB"));
    let constraints = vec![
        Constraint::ne(starts, Expression::int(0)),
        Constraint::eq(Expression::unary(UnaryOp::Length, s), Expression::int(4)),
    ];
    let result = avm(6).solve_blocking(&constraints, TIMEOUT);
    assert_satisfies(assert_sat(&result), &constraints);
}

#[tokio::test]
async fn test_async_solve_completes_prior() {
    let constraints = vec![Constraint::eq(int_var("x", 0), Expression::int(9))];
    let mut prior = Model::new();
    prior.insert("z", Value::Int(77));

    let result = avm(7)
        .solve_completing(&constraints, TIMEOUT, &prior)
        .await;
    let model = assert_sat(&result);
    assert_eq!(model.get("x"), Some(&Value::Int(9)));
    assert_eq!(model.get("z"), Some(&Value::Int(77)));
}

// ═══════════════════════════════════════════════════════════════════════════
// Distances
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_fitness_zero_iff_satisfied() {
    let constraints = vec![Constraint::eq(int_var("x", 0), Expression::int(4))];
    let mut model = Model::new();
    model.insert("x", Value::Int(4));
    assert_eq!(fitness(&constraints, &model), 0.0);

    model.insert("x", Value::Int(3));
    let near = fitness(&constraints, &model);
    model.insert("x", Value::Int(100));
    let far = fitness(&constraints, &model);
    assert!(0.0 < near && near < far && far < 1.0);
}

#[test]
fn test_regex_distance() {
    assert_eq!(regex_distance("abc", "a[b-d]c"), 0.0);
    let one_off = regex_distance("axc", "ab+c");
    let two_off = regex_distance("xxc", "ab+c");
    assert!(one_off > 0.0);
    assert!(two_off > one_off);
}

#[test]
fn test_string_distance_is_edit_guided() {
    assert_eq!(string_distance("same", "same"), 0.0);
    assert!(string_distance("sane", "same") < string_distance("xyzw", "same"));
}

proptest! {
    #[test]
    fn prop_normalize_in_unit_interval(d in 0.0f64..1e12) {
        let n = normalize(d);
        prop_assert!((0.0..1.0).contains(&n));
        prop_assert_eq!(n == 0.0, d == 0.0);
    }

    #[test]
    fn prop_string_distance_zero_iff_equal(a in "[a-z]{0,8}", b in "[a-z]{0,8}") {
        let d = string_distance(&a, &b);
        prop_assert!(d >= 0.0);
        prop_assert_eq!(d == 0.0, a == b);
        prop_assert_eq!(d, string_distance(&b, &a));
    }

    #[test]
    fn prop_regex_distance_zero_on_match(subject in "[a-c]{1,6}[0-9]") {
        prop_assert_eq!(regex_distance(&subject, "[a-c]+[0-9]"), 0.0);
        prop_assert!(regex_distance(&subject, "z[a-c]+[0-9]") > 0.0);
    }
}
