//! Local search infrastructure

pub mod avm_solver;
pub mod distance;
pub mod fitness;
pub mod integer_avm;
pub mod real_avm;
pub mod regex_distance;
pub mod string_avm;

pub use avm_solver::AvmSolver;
pub use distance::{constraint_distance, normalize, predicate_distance, string_distance};
pub use fitness::{fitness, Evaluator, Fitness};
pub use regex_distance::regex_distance;
