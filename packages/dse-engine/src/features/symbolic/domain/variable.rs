//! Symbolic variables
//!
//! Identity is the name: two variables with the same name are the same
//! variable regardless of the concrete value they were recorded with.

use super::value::{Sort, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Value domain of a variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sort", rename_all = "lowercase")]
pub enum Domain {
    Integer { min: i64, max: i64 },
    Real { min: f64, max: f64 },
    String,
}

impl Domain {
    pub fn sort(&self) -> Sort {
        match self {
            Domain::Integer { .. } => Sort::Int,
            Domain::Real { .. } => Sort::Real,
            Domain::String => Sort::String,
        }
    }
}

/// A free symbolic input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub domain: Domain,
    /// Value observed in the recorded execution
    pub concrete: Value,
}

impl Variable {
    /// Integer variable; the concrete value is clamped into `min..=max`
    pub fn integer(name: impl Into<String>, concrete: i64, min: i64, max: i64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            name: name.into(),
            domain: Domain::Integer { min, max },
            concrete: Value::Int(concrete.clamp(min, max)),
        }
    }

    /// Real variable; the concrete value is clamped into `min..=max` unless NaN
    pub fn real_in(name: impl Into<String>, concrete: f64, min: f64, max: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let concrete = if concrete.is_nan() {
            concrete
        } else {
            concrete.clamp(min, max)
        };
        Self {
            name: name.into(),
            domain: Domain::Real { min, max },
            concrete: Value::Real(concrete),
        }
    }

    pub fn string(name: impl Into<String>, concrete: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: Domain::String,
            concrete: Value::Str(concrete.into()),
        }
    }

    pub fn boolean(name: impl Into<String>, concrete: bool) -> Self {
        Self::integer(name, i64::from(concrete), 0, 1)
    }

    pub fn byte(name: impl Into<String>, concrete: i8) -> Self {
        Self::integer(name, concrete.into(), i8::MIN.into(), i8::MAX.into())
    }

    pub fn char(name: impl Into<String>, concrete: u16) -> Self {
        Self::integer(name, concrete.into(), 0, u16::MAX.into())
    }

    pub fn short(name: impl Into<String>, concrete: i16) -> Self {
        Self::integer(name, concrete.into(), i16::MIN.into(), i16::MAX.into())
    }

    pub fn int(name: impl Into<String>, concrete: i32) -> Self {
        Self::integer(name, concrete.into(), i32::MIN.into(), i32::MAX.into())
    }

    pub fn long(name: impl Into<String>, concrete: i64) -> Self {
        Self::integer(name, concrete, i64::MIN, i64::MAX)
    }

    pub fn float(name: impl Into<String>, concrete: f32) -> Self {
        Self::real_in(name, concrete.into(), f32::MIN.into(), f32::MAX.into())
    }

    pub fn double(name: impl Into<String>, concrete: f64) -> Self {
        Self::real_in(name, concrete, f64::MIN, f64::MAX)
    }

    pub fn sort(&self) -> Sort {
        self.domain.sort()
    }

    /// Clamp an integer into this variable's domain (identity for non-integer domains)
    pub fn clamp_int(&self, v: i64) -> i64 {
        match self.domain {
            Domain::Integer { min, max } => v.clamp(min, max),
            _ => v,
        }
    }

    /// Clamp a real into this variable's domain (identity for non-real domains)
    pub fn clamp_real(&self, v: f64) -> f64 {
        match self.domain {
            Domain::Real { min, max } if !v.is_nan() => v.clamp(min, max),
            _ => v,
        }
    }

    /// Integer bounds narrower than the full 64-bit range, if any
    pub fn narrow_int_bounds(&self) -> Option<(i64, i64)> {
        match self.domain {
            Domain::Integer { min, max } if min != i64::MIN || max != i64::MAX => {
                Some((min, max))
            }
            _ => None,
        }
    }

    /// Same variable with a different concrete value, coerced and clamped into the domain
    pub fn with_concrete(&self, concrete: Value) -> Self {
        let concrete = match concrete.coerce(self.sort()) {
            Value::Int(v) => Value::Int(self.clamp_int(v)),
            Value::Real(v) => Value::Real(self.clamp_real(v)),
            other => other,
        };
        Self {
            name: self.name.clone(),
            domain: self.domain.clone(),
            concrete,
        }
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_identity_is_name() {
        let a = Variable::int("x", 1);
        let b = Variable::int("x", 99);
        assert_eq!(a, b);

        let set: BTreeSet<_> = [a, b, Variable::int("y", 0)].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_primitive_ranges() {
        assert_eq!(Variable::byte("b", 0).narrow_int_bounds(), Some((-128, 127)));
        assert_eq!(Variable::char("c", 65).narrow_int_bounds(), Some((0, 65535)));
        assert_eq!(Variable::boolean("z", true).concrete, Value::Int(1));
        assert_eq!(Variable::long("l", 0).narrow_int_bounds(), None);
    }

    #[test]
    fn test_concrete_clamped() {
        let v = Variable::integer("x", 5_000, -10, 10);
        assert_eq!(v.concrete, Value::Int(10));
        assert_eq!(v.clamp_int(i64::MIN), -10);
    }

    #[test]
    fn test_with_concrete_coerces() {
        let v = Variable::double("d", 0.0).with_concrete(Value::Int(3));
        assert_eq!(v.concrete, Value::Real(3.0));
    }
}
