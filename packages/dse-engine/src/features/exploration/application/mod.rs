//! Exploration use cases

pub mod driver;
pub mod solve_chain;
pub mod suite;

pub use driver::{Driver, ExplorationReport, GeneratedInput};
pub use solve_chain::{ChainOutcome, SolveChain};
pub use suite::{ExplorationTask, SuiteExplorer, SuiteReport};
