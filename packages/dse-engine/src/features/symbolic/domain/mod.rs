//! Symbolic domain: values, variables, expressions, constraints, path conditions

pub mod constraint;
pub mod expression;
pub mod model;
pub mod operator;
pub mod path_condition;
pub mod pattern;
pub mod value;
pub mod variable;

pub use constraint::{compare_values, Constraint};
pub use expression::Expression;
pub use model::Model;
pub use operator::{BinaryOp, Comparator, StringPredicate, UnaryOp};
pub use path_condition::{BranchCondition, BranchLocation, PathCondition};
pub use value::{Sort, Value};
pub use variable::{Domain, Variable};
