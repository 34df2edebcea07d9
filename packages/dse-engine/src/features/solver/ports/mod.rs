//! Constraint Solver Port
//!
//! ```text
//! ┌─────────────────────┐
//! │ Exploration Driver  │
//! └──────────┬──────────┘
//!            │ depends on
//!            ▼
//! ┌─────────────────────┐
//! │ ConstraintSolver    │ ◄── this trait
//! └──────────┬──────────┘
//!            │ implemented by
//!            ▼
//! ┌─────────────────────┐
//! │ SmtSolver (process) │
//! │ AvmSolver (search)  │
//! └─────────────────────┘
//! ```

use crate::errors::DseError;
use crate::features::symbolic::domain::{Constraint, Model};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Why a solver gave no answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownReason {
    /// Time ran out (process killed)
    Timeout,
    /// Solver answered `unknown`
    Incomplete,
    /// Local search spent its budget
    LocalSearchExhausted,
}

/// Outcome of one solve attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SolverResult {
    Sat(Model),
    Unsat,
    Unknown(UnknownReason),
    /// Solver-reported error
    Error(String),
    /// Output that does not follow the protocol
    ParseError { raw: String, message: String },
}

impl SolverResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, SolverResult::Sat(_))
    }

    /// Worth handing to a secondary strategy (local search)
    pub fn allows_fallback(&self) -> bool {
        matches!(
            self,
            SolverResult::Unknown(_) | SolverResult::Error(_) | SolverResult::ParseError { .. }
        )
    }

    pub fn model(&self) -> Option<&Model> {
        match self {
            SolverResult::Sat(m) => Some(m),
            _ => None,
        }
    }

    /// Fill variables missing from a SAT model from `prior`
    pub fn completed_from(self, prior: &Model) -> Self {
        match self {
            SolverResult::Sat(model) => SolverResult::Sat(model.completed_from(prior)),
            other => other,
        }
    }

    /// Error view for callers that want `?` propagation
    pub fn into_result(self, timeout: Duration) -> Result<Model, DseError> {
        match self {
            SolverResult::Sat(model) => Ok(model),
            SolverResult::Unsat => Err(DseError::Unsat),
            SolverResult::Unknown(UnknownReason::Timeout) => Err(DseError::Timeout(timeout)),
            SolverResult::Unknown(UnknownReason::LocalSearchExhausted) => {
                Err(DseError::LocalSearchExhausted { evaluations: 0 })
            }
            SolverResult::Unknown(UnknownReason::Incomplete) => {
                Err(DseError::Solver("solver answered unknown".to_string()))
            }
            SolverResult::Error(message) => Err(DseError::Solver(message)),
            SolverResult::ParseError { raw, message } => Err(DseError::Parse { raw, message }),
        }
    }
}

impl fmt::Display for SolverResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverResult::Sat(model) => write!(f, "sat {}", model),
            SolverResult::Unsat => f.write_str("unsat"),
            SolverResult::Unknown(reason) => write!(f, "unknown ({:?})", reason),
            SolverResult::Error(message) => write!(f, "error: {}", message),
            SolverResult::ParseError { message, .. } => write!(f, "parse error: {}", message),
        }
    }
}

/// Constraint solver abstraction
#[async_trait]
pub trait ConstraintSolver: Send + Sync {
    /// Short name for logs and statistics
    fn name(&self) -> &'static str;

    /// Find an assignment satisfying every constraint
    async fn solve(&self, constraints: &[Constraint], timeout: Duration) -> SolverResult;

    /// Same as `solve`, then copy variables the answer lacks from `prior`
    async fn solve_completing(
        &self,
        constraints: &[Constraint],
        timeout: Duration,
        prior: &Model,
    ) -> SolverResult {
        self.solve(constraints, timeout).await.completed_from(prior)
    }
}
