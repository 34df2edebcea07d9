//! Symbolic expression trees
//!
//! Every node caches the concrete value it had in the recorded execution.
//! The cache is computed by the constructors and never trusted from input:
//! deserialization rebuilds nodes through the same constructors.

use super::model::Model;
use super::operator::{BinaryOp, StringPredicate, UnaryOp};
use super::pattern;
use super::value::{Sort, Value};
use super::variable::Variable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Typed symbolic expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ExpressionRepr", into = "ExpressionRepr")]
pub enum Expression {
    IntegerConstant(i64),
    RealConstant(f64),
    StringConstant(String),
    Variable(Variable),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        concrete: Value,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
        concrete: Value,
    },
    /// String predicate, Int 1 when it holds, else 0
    Comparison {
        predicate: StringPredicate,
        left: Box<Expression>,
        right: Box<Expression>,
        concrete: Value,
    },
    Cast {
        target: Sort,
        operand: Box<Expression>,
        concrete: Value,
    },
}

// ═══════════════════════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════════════════════

impl Expression {
    pub fn int(v: i64) -> Self {
        Expression::IntegerConstant(v)
    }

    pub fn real(v: f64) -> Self {
        Expression::RealConstant(v)
    }

    pub fn string(v: impl Into<String>) -> Self {
        Expression::StringConstant(v.into())
    }

    pub fn var(v: Variable) -> Self {
        Expression::Variable(v)
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        let concrete = apply_unary(op, operand.concrete());
        Expression::Unary {
            op,
            operand: Box::new(operand),
            concrete,
        }
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        let sort = binary_sort(op, left.sort(), right.sort());
        let concrete = apply_binary(op, sort, left.concrete(), right.concrete());
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            concrete,
        }
    }

    pub fn predicate(predicate: StringPredicate, left: Expression, right: Expression) -> Self {
        let concrete = apply_predicate(predicate, left.concrete(), right.concrete());
        Expression::Comparison {
            predicate,
            left: Box::new(left),
            right: Box::new(right),
            concrete,
        }
    }

    pub fn cast(target: Sort, operand: Expression) -> Self {
        let concrete = operand.concrete().coerce(target);
        Expression::Cast {
            target,
            operand: Box::new(operand),
            concrete,
        }
    }

    pub fn add(self, rhs: Expression) -> Self {
        Self::binary(BinaryOp::Add, self, rhs)
    }

    pub fn sub(self, rhs: Expression) -> Self {
        Self::binary(BinaryOp::Sub, self, rhs)
    }

    pub fn mul(self, rhs: Expression) -> Self {
        Self::binary(BinaryOp::Mul, self, rhs)
    }
}

impl From<Variable> for Expression {
    fn from(v: Variable) -> Self {
        Expression::Variable(v)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Queries
// ═══════════════════════════════════════════════════════════════════════════

impl Expression {
    /// Value observed in the recorded execution (O(1))
    pub fn concrete(&self) -> Value {
        match self {
            Expression::IntegerConstant(v) => Value::Int(*v),
            Expression::RealConstant(v) => Value::Real(*v),
            Expression::StringConstant(s) => Value::Str(s.clone()),
            Expression::Variable(v) => v.concrete.clone(),
            Expression::Unary { concrete, .. }
            | Expression::Binary { concrete, .. }
            | Expression::Comparison { concrete, .. }
            | Expression::Cast { concrete, .. } => concrete.clone(),
        }
    }

    pub fn sort(&self) -> Sort {
        match self {
            Expression::IntegerConstant(_) => Sort::Int,
            Expression::RealConstant(_) => Sort::Real,
            Expression::StringConstant(_) => Sort::String,
            Expression::Variable(v) => v.sort(),
            Expression::Unary { op, operand, .. } => unary_sort(*op, operand.sort()),
            Expression::Binary {
                op, left, right, ..
            } => binary_sort(*op, left.sort(), right.sort()),
            Expression::Comparison { .. } => Sort::Int,
            Expression::Cast { target, .. } => *target,
        }
    }

    /// Re-evaluate under `model`; variables missing from it keep their recorded value
    pub fn evaluate(&self, model: &Model) -> Value {
        match self {
            Expression::Variable(v) => match model.get(&v.name) {
                Some(value) => value.coerce(v.sort()),
                None => v.concrete.clone(),
            },
            Expression::Unary { op, operand, .. } => apply_unary(*op, operand.evaluate(model)),
            Expression::Binary {
                op, left, right, ..
            } => {
                let sort = binary_sort(*op, left.sort(), right.sort());
                apply_binary(*op, sort, left.evaluate(model), right.evaluate(model))
            }
            Expression::Comparison {
                predicate,
                left,
                right,
                ..
            } => apply_predicate(*predicate, left.evaluate(model), right.evaluate(model)),
            Expression::Cast {
                target, operand, ..
            } => operand.evaluate(model).coerce(*target),
            constant => constant.concrete(),
        }
    }

    /// Number of nodes
    pub fn size(&self) -> usize {
        match self {
            Expression::IntegerConstant(_)
            | Expression::RealConstant(_)
            | Expression::StringConstant(_)
            | Expression::Variable(_) => 1,
            Expression::Unary { operand, .. } | Expression::Cast { operand, .. } => {
                1 + operand.size()
            }
            Expression::Binary { left, right, .. } | Expression::Comparison { left, right, .. } => {
                1 + left.size() + right.size()
            }
        }
    }

    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Unary { operand, .. } | Expression::Cast { operand, .. } => {
                vec![operand.as_ref()]
            }
            Expression::Binary { left, right, .. } | Expression::Comparison { left, right, .. } => {
                vec![left.as_ref(), right.as_ref()]
            }
            _ => Vec::new(),
        }
    }

    /// Free variables of this tree
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    pub fn collect_variables(&self, out: &mut BTreeSet<Variable>) {
        match self {
            Expression::Variable(v) => {
                out.insert(v.clone());
            }
            other => {
                for child in other.children() {
                    child.collect_variables(out);
                }
            }
        }
    }

    pub fn has_variables(&self) -> bool {
        match self {
            Expression::Variable(_) => true,
            other => other.children().into_iter().any(Expression::has_variables),
        }
    }

    /// A MUL/DIV/REM node whose operands both contain a free variable
    pub fn is_non_linear(&self) -> bool {
        match self {
            Expression::Binary {
                op, left, right, ..
            } if op.is_multiplicative() && left.has_variables() && right.has_variables() => true,
            other => other.children().into_iter().any(Expression::is_non_linear),
        }
    }

    /// Uses an operator the SMT printer cannot express
    pub fn requires_local_search(&self) -> bool {
        let here = match self {
            Expression::Unary { op, .. } => op.requires_local_search(),
            Expression::Comparison { predicate, .. } => predicate.requires_local_search(),
            // no real remainder in SMT-LIB
            Expression::Binary {
                op: BinaryOp::Rem, ..
            } => self.sort() == Sort::Real && self.has_variables(),
            _ => false,
        };
        here || self
            .children()
            .into_iter()
            .any(Expression::requires_local_search)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Operator semantics (total: construction never fails)
// ═══════════════════════════════════════════════════════════════════════════

fn unary_sort(op: UnaryOp, operand: Sort) -> Sort {
    match op {
        UnaryOp::Neg | UnaryOp::Abs => {
            if operand == Sort::Real {
                Sort::Real
            } else {
                Sort::Int
            }
        }
        UnaryOp::Length => Sort::Int,
        UnaryOp::ToLowerCase | UnaryOp::ToUpperCase | UnaryOp::Trim => Sort::String,
    }
}

fn binary_sort(op: BinaryOp, left: Sort, right: Sort) -> Sort {
    match op {
        BinaryOp::Concat => Sort::String,
        _ if left == Sort::Real || right == Sort::Real => Sort::Real,
        _ => Sort::Int,
    }
}

pub(crate) fn apply_unary(op: UnaryOp, v: Value) -> Value {
    match op {
        UnaryOp::Neg => match v {
            Value::Real(r) => Value::Real(-r),
            other => Value::Int(other.to_int().wrapping_neg()),
        },
        UnaryOp::Abs => match v {
            Value::Real(r) => Value::Real(r.abs()),
            other => Value::Int(other.to_int().wrapping_abs()),
        },
        UnaryOp::Length => Value::Int(v.to_text().chars().count() as i64),
        UnaryOp::ToLowerCase => Value::Str(v.to_text().to_lowercase()),
        UnaryOp::ToUpperCase => Value::Str(v.to_text().to_uppercase()),
        UnaryOp::Trim => Value::Str(
            v.to_text()
                .trim_matches(|c: char| c <= ' ')
                .to_string(),
        ),
    }
}

pub(crate) fn apply_binary(op: BinaryOp, sort: Sort, l: Value, r: Value) -> Value {
    match (op, sort) {
        (BinaryOp::Concat, _) => Value::Str(l.to_text() + &r.to_text()),
        (_, Sort::Real) => {
            let (a, b) = (l.to_real(), r.to_real());
            Value::Real(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                BinaryOp::Rem => a % b,
                BinaryOp::Min => a.min(b),
                BinaryOp::Max => a.max(b),
                BinaryOp::Concat => unreachable!("handled above"),
            })
        }
        _ => {
            let (a, b) = (l.to_int(), r.to_int());
            Value::Int(match op {
                BinaryOp::Add => a.wrapping_add(b),
                BinaryOp::Sub => a.wrapping_sub(b),
                BinaryOp::Mul => a.wrapping_mul(b),
                BinaryOp::Div if b == 0 => 0,
                BinaryOp::Div => a.wrapping_div(b),
                BinaryOp::Rem if b == 0 => 0,
                BinaryOp::Rem => a.wrapping_rem(b),
                BinaryOp::Min => a.min(b),
                BinaryOp::Max => a.max(b),
                BinaryOp::Concat => unreachable!("handled above"),
            })
        }
    }
}

pub(crate) fn apply_predicate(predicate: StringPredicate, l: Value, r: Value) -> Value {
    let (subject, arg) = (l.to_text(), r.to_text());
    let holds = match predicate {
        StringPredicate::Equals => subject == arg,
        StringPredicate::EqualsIgnoreCase => subject.to_lowercase() == arg.to_lowercase(),
        StringPredicate::StartsWith => subject.starts_with(&arg),
        StringPredicate::EndsWith => subject.ends_with(&arg),
        StringPredicate::Contains => subject.contains(&arg),
        StringPredicate::Matches => pattern::full_match(&arg, &subject),
    };
    Value::Int(i64::from(holds))
}

// ═══════════════════════════════════════════════════════════════════════════
// Display
// ═══════════════════════════════════════════════════════════════════════════

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::IntegerConstant(v) => write!(f, "{}", v),
            Expression::RealConstant(v) => write!(f, "{:?}", v),
            Expression::StringConstant(s) => write!(f, "{:?}", s),
            Expression::Variable(v) => write!(f, "{}", v.name),
            Expression::Unary { op, operand, .. } => write!(f, "{}({})", op.name(), operand),
            Expression::Binary {
                op: op @ (BinaryOp::Min | BinaryOp::Max),
                left,
                right,
                ..
            } => write!(f, "{}({}, {})", op.symbol(), left, right),
            Expression::Binary {
                op, left, right, ..
            } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expression::Comparison {
                predicate,
                left,
                right,
                ..
            } => write!(f, "{}.{}({})", left, predicate.name(), right),
            Expression::Cast {
                target, operand, ..
            } => write!(f, "({}) {}", target, operand),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Wire form (concrete caches are recomputed on load)
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ExpressionRepr {
    Int {
        value: i64,
    },
    Real {
        value: f64,
    },
    String {
        value: String,
    },
    Var(Variable),
    Unary {
        op: UnaryOp,
        operand: Box<ExpressionRepr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<ExpressionRepr>,
        right: Box<ExpressionRepr>,
    },
    Predicate {
        predicate: StringPredicate,
        left: Box<ExpressionRepr>,
        right: Box<ExpressionRepr>,
    },
    Cast {
        target: Sort,
        operand: Box<ExpressionRepr>,
    },
}

impl From<ExpressionRepr> for Expression {
    fn from(repr: ExpressionRepr) -> Self {
        match repr {
            ExpressionRepr::Int { value } => Expression::int(value),
            ExpressionRepr::Real { value } => Expression::real(value),
            ExpressionRepr::String { value } => Expression::string(value),
            ExpressionRepr::Var(variable) => {
                // re-clamp and re-coerce the recorded value into the declared domain
                let concrete = variable.concrete.clone();
                Expression::var(variable.with_concrete(concrete))
            }
            ExpressionRepr::Unary { op, operand } => Expression::unary(op, (*operand).into()),
            ExpressionRepr::Binary { op, left, right } => {
                Expression::binary(op, (*left).into(), (*right).into())
            }
            ExpressionRepr::Predicate {
                predicate,
                left,
                right,
            } => Expression::predicate(predicate, (*left).into(), (*right).into()),
            ExpressionRepr::Cast { target, operand } => {
                Expression::cast(target, (*operand).into())
            }
        }
    }
}

impl From<Expression> for ExpressionRepr {
    fn from(expr: Expression) -> Self {
        match expr {
            Expression::IntegerConstant(value) => ExpressionRepr::Int { value },
            Expression::RealConstant(value) => ExpressionRepr::Real { value },
            Expression::StringConstant(value) => ExpressionRepr::String { value },
            Expression::Variable(variable) => ExpressionRepr::Var(variable),
            Expression::Unary { op, operand, .. } => ExpressionRepr::Unary {
                op,
                operand: Box::new((*operand).into()),
            },
            Expression::Binary {
                op, left, right, ..
            } => ExpressionRepr::Binary {
                op,
                left: Box::new((*left).into()),
                right: Box::new((*right).into()),
            },
            Expression::Comparison {
                predicate,
                left,
                right,
                ..
            } => ExpressionRepr::Predicate {
                predicate,
                left: Box::new((*left).into()),
                right: Box::new((*right).into()),
            },
            Expression::Cast {
                target, operand, ..
            } => ExpressionRepr::Cast {
                target,
                operand: Box::new((*operand).into()),
            },
        }
    }
}
