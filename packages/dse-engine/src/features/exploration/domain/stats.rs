//! Exploration statistics (explicit accumulator, no global counters)

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationStats {
    /// Candidates that reached the solve step
    pub attempts: u64,
    /// Attempts that produced a new input
    pub successes: u64,
    /// Attempts that did not
    pub failures: u64,

    pub unsat: u64,
    pub timeouts: u64,
    pub solver_errors: u64,
    pub parse_errors: u64,
    pub local_search_exhausted: u64,

    pub cache_hits: u64,
    pub skipped_seen: u64,
    pub skipped_retry_bound: u64,

    /// External solver invocations
    pub solver_calls: u64,
    /// Local search invocations
    pub local_search_calls: u64,
    /// Constraints handed to solvers after reduction
    pub constraints_total: u64,
}

impl ExplorationStats {
    pub fn merge(&mut self, other: &ExplorationStats) {
        self.attempts += other.attempts;
        self.successes += other.successes;
        self.failures += other.failures;
        self.unsat += other.unsat;
        self.timeouts += other.timeouts;
        self.solver_errors += other.solver_errors;
        self.parse_errors += other.parse_errors;
        self.local_search_exhausted += other.local_search_exhausted;
        self.cache_hits += other.cache_hits;
        self.skipped_seen += other.skipped_seen;
        self.skipped_retry_bound += other.skipped_retry_bound;
        self.solver_calls += other.solver_calls;
        self.local_search_calls += other.local_search_calls;
        self.constraints_total += other.constraints_total;
    }

    /// Successes per attempt (0.0 when nothing was attempted)
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f64 / self.attempts as f64
        }
    }

    /// Mean reduced constraint-set size
    pub fn average_constraints(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.constraints_total as f64 / self.attempts as f64
        }
    }
}

impl fmt::Display for ExplorationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attempts={} successes={} failures={} (unsat={} timeouts={} errors={} parse_errors={} exhausted={}) cache_hits={} skipped_seen={} skipped_retry={}",
            self.attempts,
            self.successes,
            self.failures,
            self.unsat,
            self.timeouts,
            self.solver_errors,
            self.parse_errors,
            self.local_search_exhausted,
            self.cache_hits,
            self.skipped_seen,
            self.skipped_retry_bound
        )
    }
}
