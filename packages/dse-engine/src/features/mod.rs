//! Feature modules
//!
//! - `symbolic`: expressions, constraints, models, path conditions
//! - `solver`: solver port and the external SMT adapter
//! - `local_search`: AVM fallback solver
//! - `exploration`: branch selection, reduction, input generation

pub mod exploration;
pub mod local_search;
pub mod solver;
pub mod symbolic;
