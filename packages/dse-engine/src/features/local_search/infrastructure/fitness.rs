//! Fitness evaluation under an evaluation and wall-clock budget
//!
//! The search compares [`Fitness`] lexicographically: fewer violated
//! constraints first, then a smaller raw distance sum. Raw distances keep
//! ±1 steps visible far from the target, where `d / (d + 1)` rounds to 1.

use super::distance::{constraint_distance, normalize};
use crate::errors::DseError;
use crate::features::symbolic::domain::{Constraint, Model};
use std::fmt;
use std::time::Instant;

/// Search objective; field order is the comparison order
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Fitness {
    pub unsatisfied: usize,
    pub distance: f64,
}

impl Fitness {
    pub const ZERO: Fitness = Fitness {
        unsatisfied: 0,
        distance: 0.0,
    };

    pub fn of(constraints: &[Constraint], model: &Model) -> Self {
        constraints.iter().fold(Self::ZERO, |acc, c| {
            let d = constraint_distance(c, model);
            Fitness {
                unsatisfied: acc.unsatisfied + usize::from(d > 0.0),
                distance: acc.distance + d,
            }
        })
    }

    pub fn is_zero(&self) -> bool {
        self.unsatisfied == 0
    }
}

impl fmt::Display for Fitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} unsatisfied, distance {}", self.unsatisfied, self.distance)
    }
}

/// Sum of normalized branch distances in `[0, n)`; 0 iff every constraint holds
pub fn fitness(constraints: &[Constraint], model: &Model) -> f64 {
    constraints
        .iter()
        .map(|c| normalize(constraint_distance(c, model)))
        .sum()
}

/// Counts evaluations and refuses to run past its budget
#[derive(Debug)]
pub struct Evaluator<'a> {
    constraints: &'a [Constraint],
    evaluations: u64,
    max_evaluations: u64,
    deadline: Option<Instant>,
}

impl<'a> Evaluator<'a> {
    pub fn new(constraints: &'a [Constraint], max_evaluations: u64, deadline: Option<Instant>) -> Self {
        Self {
            constraints,
            evaluations: 0,
            max_evaluations,
            deadline,
        }
    }

    pub fn constraints(&self) -> &'a [Constraint] {
        self.constraints
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Fitness of `model`, or `LocalSearchExhausted` once the budget is spent
    pub fn evaluate(&mut self, model: &Model) -> Result<Fitness, DseError> {
        if self.evaluations >= self.max_evaluations {
            return Err(self.exhausted());
        }
        // deadline sampled every 64 evaluations
        if self.evaluations % 64 == 0 && self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(self.exhausted());
        }
        self.evaluations += 1;
        Ok(Fitness::of(self.constraints, model))
    }

    fn exhausted(&self) -> DseError {
        DseError::LocalSearchExhausted {
            evaluations: self.evaluations,
        }
    }
}
