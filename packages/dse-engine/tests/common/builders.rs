//! Test data builders

use dse_engine::features::exploration::{PrimitiveValue, TestInput};
use dse_engine::features::symbolic::{
    BranchCondition, BranchLocation, Constraint, Expression, PathCondition, Variable,
};

/// Builder for PathCondition; branch `i` sits at `method@i+1`
#[derive(Debug)]
pub struct PathBuilder {
    method: String,
    branches: Vec<BranchCondition>,
}

impl PathBuilder {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            branches: Vec::new(),
        }
    }

    /// Branch whose condition evaluated to `taken`
    pub fn branch(mut self, constraint: Constraint, taken: bool) -> Self {
        let index = self.branches.len() as u32 + 1;
        self.branches.push(BranchCondition::new(
            BranchLocation::new(self.method.clone(), index),
            constraint,
            taken,
        ));
        self
    }

    pub fn build(self) -> PathCondition {
        PathCondition::new(self.branches)
    }
}

pub fn int_var(name: &str, concrete: i32) -> Expression {
    Expression::var(Variable::int(name, concrete))
}

pub fn string_var(name: &str, concrete: &str) -> Expression {
    Expression::var(Variable::string(name, concrete))
}

/// Input with one int slot per `(name, value)`
pub fn int_input(name: &str, slots: &[(&str, i32)]) -> TestInput {
    slots.iter().fold(TestInput::new(name), |input, (slot, v)| {
        input.with_slot(*slot, PrimitiveValue::Int(*v))
    })
}
