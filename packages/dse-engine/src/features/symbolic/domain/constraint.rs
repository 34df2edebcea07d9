//! Boolean constraints over expressions

use super::expression::Expression;
use super::model::Model;
use super::operator::Comparator;
use super::value::{Sort, Value};
use super::variable::Variable;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// `left comparator right`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub left: Expression,
    pub comparator: Comparator,
    pub right: Expression,
}

impl Constraint {
    pub fn new(left: Expression, comparator: Comparator, right: Expression) -> Self {
        Self {
            left,
            comparator,
            right,
        }
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::new(left, Comparator::Eq, right)
    }

    pub fn ne(left: Expression, right: Expression) -> Self {
        Self::new(left, Comparator::Ne, right)
    }

    pub fn lt(left: Expression, right: Expression) -> Self {
        Self::new(left, Comparator::Lt, right)
    }

    pub fn le(left: Expression, right: Expression) -> Self {
        Self::new(left, Comparator::Le, right)
    }

    pub fn gt(left: Expression, right: Expression) -> Self {
        Self::new(left, Comparator::Gt, right)
    }

    pub fn ge(left: Expression, right: Expression) -> Self {
        Self::new(left, Comparator::Ge, right)
    }

    /// Logical negation (comparator flipped, operands shared)
    pub fn negate(&self) -> Constraint {
        Self {
            left: self.left.clone(),
            comparator: self.comparator.negate(),
            right: self.right.clone(),
        }
    }

    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut out = self.left.variables();
        self.right.collect_variables(&mut out);
        out
    }

    pub fn shares_variable_with(&self, names: &BTreeSet<String>) -> bool {
        self.variables().iter().any(|v| names.contains(&v.name))
    }

    pub fn size(&self) -> usize {
        self.left.size() + self.right.size()
    }

    /// Sort the comparison is carried out in
    pub fn sort(&self) -> Sort {
        match (self.left.sort(), self.right.sort()) {
            (Sort::String, Sort::String) => Sort::String,
            (Sort::Real, _) | (_, Sort::Real) => Sort::Real,
            _ => Sort::Int,
        }
    }

    /// At least one free variable: something a solver can change
    pub fn is_solvable(&self) -> bool {
        self.left.has_variables() || self.right.has_variables()
    }

    pub fn is_non_linear(&self) -> bool {
        self.left.is_non_linear() || self.right.is_non_linear()
    }

    pub fn requires_local_search(&self) -> bool {
        self.left.requires_local_search() || self.right.requires_local_search()
    }

    /// Truth value under `model` (missing variables keep their recorded values)
    pub fn holds(&self, model: &Model) -> bool {
        let (l, r) = (self.left.evaluate(model), self.right.evaluate(model));
        self.comparator.accepts(compare_values(&l, &r))
    }

    /// Truth value in the recorded execution
    pub fn holds_concretely(&self) -> bool {
        self.comparator
            .accepts(compare_values(&self.left.concrete(), &self.right.concrete()))
    }
}

/// Ordering between two values; strings compare lexicographically, numbers numerically
pub fn compare_values(l: &Value, r: &Value) -> Option<Ordering> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Str(_), _) | (_, Value::Str(_)) => Some(l.to_text().cmp(&r.to_text())),
        _ => l.to_real().partial_cmp(&r.to_real()),
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.comparator, self.right)
    }
}
