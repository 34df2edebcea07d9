//! Exploration domain: test inputs, budgets, statistics

pub mod budget;
pub mod stats;
pub mod test_input;

pub use budget::{budget_from_config, IndividualsBudget, SearchBudget, UnlimitedBudget, WallClockBudget};
pub use stats::ExplorationStats;
pub use test_input::{PatchError, PrimitiveValue, SlotType, TestInput};
