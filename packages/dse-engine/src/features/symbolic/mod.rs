//! Symbolic Expression & Constraint Model
//!
//! Pure data: typed expression trees with cached concrete values, boolean
//! constraints over them, and the ordered branch decisions of one execution.

pub mod domain;

pub use domain::*;
