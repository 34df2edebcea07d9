//! Operators of the expression algebra

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Abs,
    /// String length (Int-valued)
    Length,
    ToLowerCase,
    ToUpperCase,
    Trim,
}

impl UnaryOp {
    /// Operators without an SMT-LIB string theory counterpart
    pub fn requires_local_search(&self) -> bool {
        matches!(
            self,
            UnaryOp::ToLowerCase | UnaryOp::ToUpperCase | UnaryOp::Trim
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Abs => "abs",
            UnaryOp::Length => "length",
            UnaryOp::ToLowerCase => "lower",
            UnaryOp::ToUpperCase => "upper",
            UnaryOp::Trim => "trim",
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Min,
    Max,
    Concat,
}

impl BinaryOp {
    /// Operators whose product of two symbolic operands leaves linear arithmetic
    pub fn is_multiplicative(&self) -> bool {
        matches!(self, BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
            BinaryOp::Concat => "++",
        }
    }
}

/// String predicates; the node evaluates to Int 1 (holds) or 0
///
/// `left` is the receiver, `right` the argument: `left.startsWith(right)`,
/// `left.matches(right)` with `right` the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringPredicate {
    Equals,
    EqualsIgnoreCase,
    StartsWith,
    EndsWith,
    Contains,
    Matches,
}

impl StringPredicate {
    pub fn requires_local_search(&self) -> bool {
        matches!(
            self,
            StringPredicate::EqualsIgnoreCase | StringPredicate::Matches
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            StringPredicate::Equals => "equals",
            StringPredicate::EqualsIgnoreCase => "equalsIgnoreCase",
            StringPredicate::StartsWith => "startsWith",
            StringPredicate::EndsWith => "endsWith",
            StringPredicate::Contains => "contains",
            StringPredicate::Matches => "matches",
        }
    }
}

/// Constraint comparators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Comparator {
    /// Logical negation: `!(a < b)` is `a >= b`
    pub fn negate(&self) -> Comparator {
        match self {
            Comparator::Lt => Comparator::Ge,
            Comparator::Le => Comparator::Gt,
            Comparator::Gt => Comparator::Le,
            Comparator::Ge => Comparator::Lt,
            Comparator::Eq => Comparator::Ne,
            Comparator::Ne => Comparator::Eq,
        }
    }

    /// Whether the comparator accepts an ordering; `None` (unordered, NaN) only satisfies `Ne`
    pub fn accepts(&self, ordering: Option<Ordering>) -> bool {
        match ordering {
            None => matches!(self, Comparator::Ne),
            Some(o) => match self {
                Comparator::Lt => o == Ordering::Less,
                Comparator::Le => o != Ordering::Greater,
                Comparator::Gt => o == Ordering::Greater,
                Comparator::Ge => o != Ordering::Less,
                Comparator::Eq => o == Ordering::Equal,
                Comparator::Ne => o != Ordering::Equal,
            },
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
