//! Constraint Solving
//!
//! `ports` holds the `ConstraintSolver` trait and result type;
//! `infrastructure` holds the external SMT process adapter.

pub mod infrastructure;
pub mod ports;

pub use infrastructure::SmtSolver;
pub use ports::{ConstraintSolver, SolverResult, UnknownReason};
