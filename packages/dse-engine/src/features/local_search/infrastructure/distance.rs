//! Branch distances
//!
//! How far an assignment is from making a constraint true. 0 means the
//! constraint holds; larger is worse. `f64::MAX` marks "no gradient".

use super::regex_distance::regex_distance;
use crate::features::symbolic::domain::{
    compare_values, Comparator, Constraint, Expression, Model, Sort, StringPredicate, Value,
};

/// Map `[0, ∞)` onto `[0, 1)`
pub fn normalize(distance: f64) -> f64 {
    if distance.is_nan() || distance >= f64::MAX {
        return 1.0;
    }
    distance / (distance + 1.0)
}

/// Distance of `constraint` from holding under `model`
pub fn constraint_distance(constraint: &Constraint, model: &Model) -> f64 {
    if let Some(d) = predicate_constraint_distance(constraint, model) {
        return d;
    }

    let left = constraint.left.evaluate(model);
    let right = constraint.right.evaluate(model);
    match constraint.sort() {
        Sort::Int => {
            let diff = i128::from(left.to_int()) - i128::from(right.to_int());
            comparator_distance(constraint.comparator, diff as f64)
        }
        Sort::Real => comparator_distance(constraint.comparator, left.to_real() - right.to_real()),
        Sort::String => string_comparison_distance(constraint.comparator, &left, &right),
    }
}

/// Numeric distance for `l - r = diff`
pub fn comparator_distance(comparator: Comparator, diff: f64) -> f64 {
    if diff.is_nan() {
        return if comparator == Comparator::Ne { 0.0 } else { f64::MAX };
    }
    match comparator {
        Comparator::Eq => diff.abs(),
        Comparator::Ne => {
            if diff != 0.0 {
                0.0
            } else {
                1.0
            }
        }
        Comparator::Lt => {
            if diff < 0.0 {
                0.0
            } else {
                diff + 1.0
            }
        }
        Comparator::Le => {
            if diff <= 0.0 {
                0.0
            } else {
                diff
            }
        }
        Comparator::Gt => {
            if diff > 0.0 {
                0.0
            } else {
                diff.abs() + 1.0
            }
        }
        Comparator::Ge => {
            if diff >= 0.0 {
                0.0
            } else {
                diff.abs()
            }
        }
    }
}

fn string_comparison_distance(comparator: Comparator, left: &Value, right: &Value) -> f64 {
    let (l, r) = (left.to_text(), right.to_text());
    match comparator {
        Comparator::Eq => string_distance(&l, &r),
        Comparator::Ne => {
            if l != r {
                0.0
            } else {
                1.0
            }
        }
        _ if comparator.accepts(compare_values(left, right)) => 0.0,
        _ => 1.0,
    }
}

/// `pred(a, b) <cmp> k` with a constant `k`: distance by wanted truth value
fn predicate_constraint_distance(constraint: &Constraint, model: &Model) -> Option<f64> {
    let (predicate_side, constant, flipped) = match (&constraint.left, &constraint.right) {
        (p @ Expression::Comparison { .. }, k) if !k.has_variables() => (p, k.concrete(), false),
        (k, p @ Expression::Comparison { .. }) if !k.has_variables() => (p, k.concrete(), true),
        _ => return None,
    };
    let Expression::Comparison {
        predicate,
        left,
        right,
        ..
    } = predicate_side
    else {
        return None;
    };

    let accepts = |truth: i64| {
        let v = Value::Int(truth);
        let ordering = if flipped {
            compare_values(&constant, &v)
        } else {
            compare_values(&v, &constant)
        };
        constraint.comparator.accepts(ordering)
    };

    let subject = left.evaluate(model).to_text();
    let argument = right.evaluate(model).to_text();
    let distance = match (accepts(1), accepts(0)) {
        (true, true) => 0.0,
        (false, false) => f64::MAX,
        (true, false) => predicate_distance(*predicate, &subject, &argument),
        (false, true) => {
            if predicate_distance(*predicate, &subject, &argument) > 0.0 {
                0.0
            } else {
                f64::MAX
            }
        }
    };
    Some(distance)
}

/// Distance of `subject.predicate(argument)` from being true
pub fn predicate_distance(predicate: StringPredicate, subject: &str, argument: &str) -> f64 {
    match predicate {
        StringPredicate::Equals => string_distance(subject, argument),
        StringPredicate::EqualsIgnoreCase => {
            string_distance(&subject.to_lowercase(), &argument.to_lowercase())
        }
        StringPredicate::StartsWith => {
            let n = argument.chars().count();
            let prefix: String = subject.chars().take(n).collect();
            string_distance(&prefix, argument)
        }
        StringPredicate::EndsWith => {
            let n = argument.chars().count();
            let len = subject.chars().count();
            let suffix: String = subject.chars().skip(len.saturating_sub(n)).collect();
            string_distance(&suffix, argument)
        }
        StringPredicate::Contains => contains_distance(subject, argument),
        StringPredicate::Matches => regex_distance(subject, argument),
    }
}

/// Length difference plus normalized per-character distance over the common prefix
pub fn string_distance(a: &str, b: &str) -> f64 {
    let (a, b): (Vec<char>, Vec<char>) = (a.chars().collect(), b.chars().collect());
    let length_gap = a.len().abs_diff(b.len()) as f64;
    let chars: f64 = a
        .iter()
        .zip(&b)
        .map(|(x, y)| normalize(f64::from((*x as u32).abs_diff(*y as u32))))
        .sum();
    length_gap + chars
}

fn contains_distance(subject: &str, needle: &str) -> f64 {
    let s: Vec<char> = subject.chars().collect();
    let n = needle.chars().count();
    if n == 0 {
        return 0.0;
    }
    if s.len() < n {
        return string_distance(subject, needle);
    }
    s.windows(n)
        .map(|w| string_distance(&w.iter().collect::<String>(), needle))
        .fold(f64::MAX, f64::min)
}
