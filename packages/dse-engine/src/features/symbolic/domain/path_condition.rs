//! Path Condition Domain Models
//!
//! Branch decisions recorded along one concrete execution, in order.

use super::constraint::Constraint;
use super::model::Model;
use super::variable::Variable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Stable identifier of a decision point
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchLocation {
    pub method: String,
    pub instruction_index: u32,
}

impl BranchLocation {
    pub fn new(method: impl Into<String>, instruction_index: u32) -> Self {
        Self {
            method: method.into(),
            instruction_index,
        }
    }
}

impl fmt::Display for BranchLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.method, self.instruction_index)
    }
}

/// One decision point of the execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchCondition {
    pub location: BranchLocation,

    /// Branch condition as written in the source
    pub constraint: Constraint,

    /// Constraints that must hold for the decision point to be reached
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supporting: Vec<Constraint>,

    /// Whether `constraint` evaluated to true in the execution
    pub taken: bool,
}

impl BranchCondition {
    pub fn new(location: BranchLocation, constraint: Constraint, taken: bool) -> Self {
        Self {
            location,
            constraint,
            supporting: Vec::new(),
            taken,
        }
    }

    pub fn with_supporting(mut self, supporting: Vec<Constraint>) -> Self {
        self.supporting = supporting;
        self
    }

    /// Constraint that held along the recorded path
    pub fn path_constraint(&self) -> Constraint {
        if self.taken {
            self.constraint.clone()
        } else {
            self.constraint.negate()
        }
    }

    /// Constraint that drives execution down the other side
    pub fn flipped_constraint(&self) -> Constraint {
        self.path_constraint().negate()
    }
}

/// Ordered branch decisions of one execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathCondition(Vec<BranchCondition>);

impl PathCondition {
    pub fn new(branches: Vec<BranchCondition>) -> Self {
        Self(branches)
    }

    pub fn push(&mut self, branch: BranchCondition) {
        self.0.push(branch);
    }

    pub fn branches(&self) -> &[BranchCondition] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BranchCondition> {
        self.0.get(index)
    }

    /// Constraints that must hold to reach branch `index`: the supporting and
    /// path constraints of every earlier branch, then the branch's own supporting ones
    pub fn reaching_constraints(&self, index: usize) -> Vec<Constraint> {
        let mut out = Vec::new();
        for branch in self.0.iter().take(index) {
            out.extend(branch.supporting.iter().cloned());
            out.push(branch.path_constraint());
        }
        if let Some(target) = self.0.get(index) {
            out.extend(target.supporting.iter().cloned());
        }
        out
    }

    /// All free variables of the recorded path
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut out = BTreeSet::new();
        for branch in &self.0 {
            out.extend(branch.constraint.variables());
            for s in &branch.supporting {
                out.extend(s.variables());
            }
        }
        out
    }

    /// Recorded values of every variable on the path
    pub fn concrete_model(&self) -> Model {
        Model::from_variables(self.variables().iter())
    }

    /// Decisions a new execution must reproduce after flipping branch `index`
    pub fn expected_prefix(&self, index: usize) -> Vec<(BranchLocation, bool)> {
        self.0
            .iter()
            .take(index + 1)
            .enumerate()
            .map(|(i, b)| (b.location.clone(), if i == index { !b.taken } else { b.taken }))
            .collect()
    }

    /// First position where this path departs from `expected`, if any.
    /// A path shorter than `expected` diverges at its end.
    pub fn diverges_from(&self, expected: &[(BranchLocation, bool)]) -> Option<usize> {
        for (i, (location, taken)) in expected.iter().enumerate() {
            match self.0.get(i) {
                Some(b) if &b.location == location && b.taken == *taken => continue,
                _ => return Some(i),
            }
        }
        None
    }
}

impl FromIterator<BranchCondition> for PathCondition {
    fn from_iter<T: IntoIterator<Item = BranchCondition>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
