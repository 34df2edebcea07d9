//! Solver chain: external SMT solver first, local search as fallback
//!
//! ```text
//! non-linear / no SMT encoding / no solver ──► local search
//! otherwise ──► SMT ──► Sat | Unsat                 (final)
//!                  └──► Unknown | Error | ParseError ──► local search (if enabled)
//! ```

use crate::config::ValidatedConfig;
use crate::errors::DseError;
use crate::features::local_search::AvmSolver;
use crate::features::solver::{ConstraintSolver, SmtSolver, SolverResult};
use crate::features::symbolic::domain::{Constraint, Model};
use std::sync::Arc;
use std::time::Duration;

/// Result of one chain run plus which solvers it touched
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome {
    pub result: SolverResult,
    pub solver_calls: u32,
    pub local_search_calls: u32,
}

pub struct SolveChain {
    smt: Option<Arc<dyn ConstraintSolver>>,
    local: Arc<dyn ConstraintSolver>,
    fallback_enabled: bool,
    timeout: Duration,
}

impl SolveChain {
    pub fn new(
        smt: Option<Arc<dyn ConstraintSolver>>,
        local: Arc<dyn ConstraintSolver>,
        fallback_enabled: bool,
        timeout: Duration,
    ) -> Self {
        Self {
            smt,
            local,
            fallback_enabled,
            timeout,
        }
    }

    /// SMT solver when an executable is configured (must resolve), local search always
    pub fn from_config(config: &ValidatedConfig) -> Result<Self, DseError> {
        let smt: Option<Arc<dyn ConstraintSolver>> = match config.solver().executable {
            Some(_) => Some(Arc::new(SmtSolver::new(config.solver())?)),
            None => None,
        };
        Ok(Self::with_solver(config, smt))
    }

    /// Chain around an injected external solver
    pub fn with_solver(config: &ValidatedConfig, smt: Option<Arc<dyn ConstraintSolver>>) -> Self {
        Self::new(
            smt,
            Arc::new(AvmSolver::new(config.local_search().clone())),
            config.local_search().fallback_enabled,
            config.solver().timeout(),
        )
    }

    pub fn has_external_solver(&self) -> bool {
        self.smt.is_some()
    }

    /// Constraint sets the external solver cannot take
    pub fn needs_local_search(constraints: &[Constraint]) -> bool {
        constraints
            .iter()
            .any(|c| c.is_non_linear() || c.requires_local_search())
    }

    /// Solve `constraints`; SAT models are completed from `prior`
    pub async fn solve(&self, constraints: &[Constraint], prior: &Model) -> ChainOutcome {
        let mut outcome = ChainOutcome {
            result: SolverResult::Unsat,
            solver_calls: 0,
            local_search_calls: 0,
        };

        let smt = match &self.smt {
            Some(smt) if !Self::needs_local_search(constraints) => smt,
            _ => {
                outcome.local_search_calls += 1;
                outcome.result = self
                    .local
                    .solve_completing(constraints, self.timeout, prior)
                    .await;
                return outcome;
            }
        };

        outcome.solver_calls += 1;
        let result = smt.solve_completing(constraints, self.timeout, prior).await;

        if result.allows_fallback() && self.fallback_enabled {
            tracing::debug!(
                solver = smt.name(),
                result = %result,
                "falling back to local search"
            );
            outcome.local_search_calls += 1;
            outcome.result = self
                .local
                .solve_completing(constraints, self.timeout, prior)
                .await;
        } else {
            outcome.result = result;
        }
        outcome
    }
}

impl std::fmt::Debug for SolveChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolveChain")
            .field("smt", &self.smt.as_ref().map(|s| s.name()))
            .field("local", &self.local.name())
            .field("fallback_enabled", &self.fallback_enabled)
            .field("timeout", &self.timeout)
            .finish()
    }
}
