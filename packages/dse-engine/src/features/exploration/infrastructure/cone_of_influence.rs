//! Cone-of-influence reduction
//!
//! Keeps only the reaching constraints that transitively share a variable
//! with the target. The scan runs backward from the target and grows the
//! dependency set with every constraint it keeps.

use crate::features::symbolic::domain::Constraint;
use std::collections::BTreeSet;

/// Reduced system: the kept reaching constraints in their original order, then `target`
pub fn cone_of_influence(reaching: &[Constraint], target: &Constraint) -> Vec<Constraint> {
    let mut dependencies: BTreeSet<String> =
        target.variables().into_iter().map(|v| v.name).collect();
    let mut kept = Vec::new();

    for constraint in reaching.iter().rev() {
        if constraint.shares_variable_with(&dependencies) {
            dependencies.extend(constraint.variables().into_iter().map(|v| v.name));
            kept.push(constraint.clone());
        }
    }

    kept.reverse();
    kept.push(target.clone());
    kept
}
