//! Solver infrastructure: SMT-LIB rendering, process I/O, model parsing

pub mod model_parser;
pub mod process;
pub mod smt_solver;
pub mod smtlib_printer;

pub use model_parser::{parse_model, ModelParseError};
pub use smt_solver::SmtSolver;
pub use smtlib_printer::{render_query, PrintError};
