//! Local Search (Alternating Variable Method)
//!
//! Solver-free fallback: perturbs one free variable at a time, guided by
//! branch distances, until every constraint holds or the budget runs out.
//! Used when constraints are non-linear, use operators without an SMT
//! encoding, no external solver is configured, or the solver gave no answer.

pub mod infrastructure;

pub use infrastructure::{regex_distance, AvmSolver, Evaluator};
