//! Path Exploration
//!
//! ```text
//! PathCondition ──► rank ──► cone of influence ──► solve chain ──► Model
//!                                                                   │
//!                        patched TestInput ◄── slot conversion ◄────┘
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{
    Driver, ExplorationReport, ExplorationTask, GeneratedInput, SolveChain, SuiteExplorer,
    SuiteReport,
};
pub use domain::{ExplorationStats, PatchError, PrimitiveValue, SearchBudget, SlotType, TestInput};
