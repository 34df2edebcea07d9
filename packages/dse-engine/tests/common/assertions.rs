//! Custom assertions for test verification

use dse_engine::features::exploration::{ExplorationReport, GeneratedInput, PrimitiveValue};
use dse_engine::features::solver::SolverResult;
use dse_engine::features::symbolic::{BranchLocation, Constraint, Model};

/// Assert the solver answered SAT and return the model
pub fn assert_sat(result: &SolverResult) -> &Model {
    match result {
        SolverResult::Sat(model) => model,
        other => panic!("Expected sat, got: {other}"),
    }
}

/// Assert the model makes every constraint hold
pub fn assert_satisfies(model: &Model, constraints: &[Constraint]) {
    for c in constraints {
        assert!(c.holds(model), "Constraint {c} does not hold under {model}");
    }
}

/// Assert the report contains an input flipping `target`, and return it
pub fn assert_generated_for<'a>(
    report: &'a ExplorationReport,
    target: &BranchLocation,
) -> &'a GeneratedInput {
    report
        .generated
        .iter()
        .find(|g| &g.target == target)
        .unwrap_or_else(|| {
            panic!(
                "Expected an input for {target}, got targets: {:?}",
                report.generated.iter().map(|g| g.target.to_string()).collect::<Vec<_>>()
            )
        })
}

/// Int slot value of a generated input
pub fn int_slot(generated: &GeneratedInput, name: &str) -> i32 {
    match generated.input.slot(name) {
        Some(PrimitiveValue::Int(v)) => *v,
        other => panic!("Expected int slot '{name}', got: {other:?}"),
    }
}
