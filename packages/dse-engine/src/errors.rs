//! Error types for dse-engine
//!
//! Per-branch solve failures are folded into `SolverResult` and exploration
//! statistics. Only misconfiguration escapes to the caller as a hard failure.

use crate::config::ConfigError;
use std::time::Duration;
use thiserror::Error;

/// Main error type for dse-engine operations
#[derive(Debug, Error)]
pub enum DseError {
    /// Solver exceeded its allotted time (process killed)
    #[error("Solver timed out after {0:?}")]
    Timeout(Duration),

    /// Constraint system proven unsatisfiable
    #[error("Constraint system is unsatisfiable")]
    Unsat,

    /// External solver reported an error
    #[error("Solver error: {0}")]
    Solver(String),

    /// Unparseable solver output
    #[error("Parse error: {message} (raw output: {raw:?})")]
    Parse { raw: String, message: String },

    /// Solver binary unset or unreachable
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// Local search spent its budget without converging
    #[error("Local search exhausted after {evaluations} evaluations")]
    LocalSearchExhausted { evaluations: u64 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl DseError {
    pub fn misconfiguration(msg: impl Into<String>) -> Self {
        Self::Misconfiguration(msg.into())
    }

    pub fn parse(raw: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            raw: raw.into(),
            message: message.into(),
        }
    }

    /// Retry classification
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Timeout(_) | Self::LocalSearchExhausted { .. } => ErrorCategory::Transient,
            Self::Unsat | Self::Solver(_) | Self::Parse { .. } => ErrorCategory::Permanent,
            Self::Misconfiguration(_) | Self::Io(_) | Self::Config(_) => {
                ErrorCategory::Infrastructure
            }
        }
    }

    /// Whether this error must abort exploration instead of counting as a failed attempt
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Infrastructure
    }
}

/// Error category for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transient - the branch may be retried (timeout, search budget)
    Transient,
    /// Permanent - retrying the same query is pointless (unsat, solver error)
    Permanent,
    /// Infrastructure - setup is broken (missing binary, bad config)
    Infrastructure,
}

/// Result type alias for dse-engine operations
pub type Result<T> = std::result::Result<T, DseError>;
