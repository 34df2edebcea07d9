//! Expression algebra, path conditions and input patching
//!
//! Covers:
//! - concrete values cached at construction and recomputed on load
//! - re-evaluation under models
//! - reaching constraints and expected prefixes
//! - model to input patching with narrowing conversions

#[path = "../common/mod.rs"]
mod common;

use common::*;
use dse_engine::features::exploration::{PatchError, PrimitiveValue, TestInput};
use dse_engine::features::symbolic::{
    BinaryOp, BranchLocation, Constraint, Expression, Model, PathCondition, Sort, StringPredicate,
    UnaryOp, Value, Variable,
};
use pretty_assertions::assert_eq;

// ═══════════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_concrete_values_follow_operators() {
    let x = int_var("x", 7);
    let e = Expression::binary(BinaryOp::Rem, x.clone().mul(Expression::int(3)), Expression::int(4));
    assert_eq!(e.concrete(), Value::Int(1));

    let div_zero = Expression::binary(BinaryOp::Div, x, Expression::int(0));
    assert_eq!(div_zero.concrete(), Value::Int(0));

    let s = string_var("s", "  Hi ");
    let trimmed = Expression::unary(UnaryOp::Trim, s);
    assert_eq!(trimmed.concrete(), Value::Str("Hi".to_string()));
    assert_eq!(Expression::unary(UnaryOp::Length, trimmed).concrete(), Value::Int(2));
}

#[test]
fn test_evaluate_under_model() {
    let e = int_var("x", 1).add(int_var("y", 2));
    let mut model = Model::new();
    model.insert("x", Value::Int(40));
    // y keeps its recorded value
    assert_eq!(e.evaluate(&model), Value::Int(42));
}

#[test]
fn test_predicate_is_int_valued() {
    let p = Expression::predicate(
        StringPredicate::StartsWith,
        string_var("s", "hello"),
        Expression::string("he"),
    );
    assert_eq!(p.sort(), Sort::Int);
    assert_eq!(p.concrete(), Value::Int(1));
}

#[test]
fn test_non_linear_detection() {
    let x = int_var("x", 1);
    let y = int_var("y", 2);
    assert!(x.clone().mul(y).is_non_linear());
    assert!(!x.mul(Expression::int(3)).is_non_linear());
}

#[test]
fn test_deserialization_recomputes_concrete() {
    let json = r#"{
        "kind": "binary",
        "op": "add",
        "left": {"kind": "var", "name": "x", "domain": {"sort": "integer", "min": -128, "max": 127}, "concrete": 500},
        "right": {"kind": "int", "value": 1}
    }"#;
    let e: Expression = serde_json::from_str(json).unwrap();
    // the recorded 500 is clamped into the byte domain before use
    assert_eq!(e.concrete(), Value::Int(128));
}

#[test]
fn test_loaded_matches_predicate_honours_inline_flags() {
    let json = r#"{
        "kind": "predicate",
        "predicate": "matches",
        "left": {"kind": "var", "name": "s", "domain": {"sort": "string"}, "concrete": "ABC"},
        "right": {"kind": "string", "value": "(?i)abc"}
    }"#;
    let e: Expression = serde_json::from_str(json).unwrap();
    assert_eq!(e.concrete(), Value::Int(1));

    let digit_class = Expression::predicate(
        StringPredicate::Matches,
        string_var("s", "5"),
        Expression::string(r"\\d"),
    );
    assert_eq!(digit_class.concrete(), Value::Int(0));
}

#[test]
fn test_constraint_serde_roundtrip() {
    let c = Constraint::le(int_var("x", 3).sub(Expression::int(1)), Expression::int(10));
    let json = serde_json::to_string(&c).unwrap();
    let back: Constraint = serde_json::from_str(&json).unwrap();
    assert_eq!(back, c);
    assert_eq!(back.to_string(), "(x - 1) <= 10");
}

// ═══════════════════════════════════════════════════════════════════════════
// Path conditions
// ═══════════════════════════════════════════════════════════════════════════

fn two_branch_path() -> PathCondition {
    PathBuilder::new("m")
        .branch(Constraint::lt(int_var("x", 5), Expression::int(0)), false)
        .branch(Constraint::eq(int_var("x", 5), Expression::int(5)), true)
        .build()
}

#[test]
fn test_reaching_constraints_use_path_polarity() {
    let path = two_branch_path();
    let reaching = path.reaching_constraints(1);
    assert_eq!(reaching, vec![Constraint::ge(int_var("x", 5), Expression::int(0))]);
    assert_eq!(
        path.get(1).unwrap().flipped_constraint(),
        Constraint::ne(int_var("x", 5), Expression::int(5))
    );
}

#[test]
fn test_expected_prefix_flips_last() {
    let path = two_branch_path();
    assert_eq!(
        path.expected_prefix(1),
        vec![(BranchLocation::new("m", 1), false), (BranchLocation::new("m", 2), false)]
    );
    assert_eq!(path.diverges_from(&path.expected_prefix(1)), Some(1));
    assert_eq!(path.diverges_from(&[(BranchLocation::new("m", 1), false)]), None);
}

#[test]
fn test_concrete_model_collects_variables() {
    let path = two_branch_path();
    let model = path.concrete_model();
    assert_eq!(model.get("x"), Some(&Value::Int(5)));
    assert_eq!(model.len(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Patching
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_patch_narrows_to_slot_type() {
    let input = TestInput::new("t")
        .with_slot("b", PrimitiveValue::Byte(0))
        .with_slot("flag", PrimitiveValue::Boolean(false))
        .with_slot("s", PrimitiveValue::String(String::new()));
    let model: Model = [
        ("b".to_string(), Value::Int(300)),
        ("flag".to_string(), Value::Int(2)),
        ("s".to_string(), Value::Str("ok".to_string())),
    ]
    .into_iter()
    .collect();

    let patched = input.patched(&model).unwrap();
    assert_eq!(patched.slot("b"), Some(&PrimitiveValue::Byte(44)));
    assert_eq!(patched.slot("flag"), Some(&PrimitiveValue::Boolean(true)));
    assert_eq!(patched.slot("s"), Some(&PrimitiveValue::String("ok".to_string())));
}

#[test]
fn test_patch_errors() {
    let input = int_input("t", &[("x", 1)]);
    assert_eq!(input.patched(&Model::new()), Err(PatchError::EmptyModel));

    let mut model = Model::new();
    model.insert("y", Value::Int(2));
    assert_eq!(input.patched(&model), Err(PatchError::MissingSlot("y".to_string())));

    let mut model = Model::new();
    model.insert("x", Value::Str("nope".to_string()));
    assert!(matches!(
        input.patched(&model),
        Err(PatchError::IncompatibleValue { .. })
    ));
}

#[test]
fn test_input_json_shape() {
    let input = int_input("t", &[("x", 3)]);
    let json = serde_json::to_value(&input).unwrap();
    assert_eq!(json["slots"]["x"]["type"], "int");
    assert_eq!(json["slots"]["x"]["value"], 3);

    let v = Variable::byte("b", -1);
    assert_eq!(v.narrow_int_bounds(), Some((-128, 127)));
}
