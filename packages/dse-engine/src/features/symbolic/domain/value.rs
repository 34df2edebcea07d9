//! Concrete values and sorts
//!
//! A `Value` is what a symbolic node evaluated to in the recorded execution,
//! or what a solver assigned to a variable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Solver sort of an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    Int,
    Real,
    String,
}

impl Sort {
    /// SMT-LIB sort name
    pub fn smt_name(&self) -> &'static str {
        match self {
            Sort::Int => "Int",
            Sort::Real => "Real",
            Sort::String => "String",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Sort::String)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.smt_name())
    }
}

/// Type-tagged concrete value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Real(f64),
    Str(String),
}

impl Value {
    pub fn sort(&self) -> Sort {
        match self {
            Value::Int(_) => Sort::Int,
            Value::Real(_) => Sort::Real,
            Value::Str(_) => Sort::String,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Real(v) => Some(*v),
            Value::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view: reals truncate toward zero (saturating), strings parse or fall back to 0
    pub fn to_int(&self) -> i64 {
        match self {
            Value::Int(v) => *v,
            Value::Real(v) => *v as i64,
            Value::Str(s) => s.trim().parse().unwrap_or(0),
        }
    }

    /// Real view: strings parse or fall back to 0.0
    pub fn to_real(&self) -> f64 {
        match self {
            Value::Int(v) => *v as f64,
            Value::Real(v) => *v,
            Value::Str(s) => s.trim().parse().unwrap_or(0.0),
        }
    }

    /// String view as produced by string conversion of the value
    pub fn to_text(&self) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::Real(v) => v.to_string(),
            Value::Str(s) => s.clone(),
        }
    }

    /// Convert into the given sort
    pub fn coerce(&self, sort: Sort) -> Value {
        match sort {
            Sort::Int => Value::Int(self.to_int()),
            Sort::Real => Value::Real(self.to_real()),
            Sort::String => Value::Str(self.to_text()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{:?}", v),
            Value::Str(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}
