//! Section-specific configuration types
//!
//! Each engine component has its own configuration struct with validation.

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use super::validation::Validatable;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// External SMT solver
// ============================================================================

/// External SMT solver process configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Solver binary (absolute path or name resolved on PATH).
    /// `None` routes every query to the local search.
    pub executable: Option<PathBuf>,

    /// Arguments making the solver read SMT-LIB from stdin
    pub args: Vec<String>,

    /// Per-query timeout in milliseconds (1..=600000)
    pub timeout_ms: u64,

    /// Assert domain bounds of narrow integer variables (byte, char, int, ...)
    pub add_variable_bounds: bool,
}

fn default_solver_args() -> Vec<String> {
    vec!["-smt2".to_string(), "-in".to_string()]
}

impl SolverConfig {
    pub const FIELDS: &'static [&'static str] =
        &["executable", "args", "timeout_ms", "add_variable_bounds"];

    pub fn from_preset(preset: Preset) -> Self {
        let (timeout_ms, add_variable_bounds) = match preset {
            Preset::Fast => (1_000, false),
            Preset::Balanced | Preset::Custom => (5_000, false),
            Preset::Thorough => (30_000, true),
        };
        Self {
            executable: None,
            args: default_solver_args(),
            timeout_ms,
            add_variable_bounds,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Builder: Set executable
    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Builder: Remove executable (local search only)
    pub fn no_executable(mut self) -> Self {
        self.executable = None;
        self
    }

    /// Builder: Set args
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: Set timeout_ms
    pub fn timeout_ms(mut self, v: u64) -> Self {
        self.timeout_ms = v;
        self
    }

    /// Builder: Set add_variable_bounds
    pub fn add_variable_bounds(mut self, v: bool) -> Self {
        self.add_variable_bounds = v;
        self
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl Validatable for SolverConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.timeout_ms == 0 || self.timeout_ms > 600_000 {
            return Err(ConfigError::range_with_hint(
                "timeout_ms",
                self.timeout_ms,
                1,
                600_000,
                "Solver timeout must be positive and at most 10 minutes",
            ));
        }

        if let Some(path) = &self.executable {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(
                    "solver.executable is empty; omit it to use local search only".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "solver"
    }
}

// ============================================================================
// Local search (AVM)
// ============================================================================

/// Alternating Variable Method configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSearchConfig {
    /// Fall back to local search on solver Unknown/Error/ParseError
    pub fallback_enabled: bool,

    /// Fitness evaluations per solve (1..=100000000)
    pub max_evaluations: u64,

    /// Randomized restarts after a local optimum (0..=1000)
    pub max_restarts: u32,

    /// Wall-clock cutoff per solve in milliseconds (0 = unlimited)
    pub time_limit_ms: u64,

    /// RNG seed for restarts and string insertions (None = entropy)
    pub seed: Option<u64>,
}

impl LocalSearchConfig {
    pub const FIELDS: &'static [&'static str] = &[
        "fallback_enabled",
        "max_evaluations",
        "max_restarts",
        "time_limit_ms",
        "seed",
    ];

    pub fn from_preset(preset: Preset) -> Self {
        let (max_evaluations, max_restarts, time_limit_ms) = match preset {
            Preset::Fast => (20_000, 0, 2_000),
            Preset::Balanced | Preset::Custom => (200_000, 3, 10_000),
            Preset::Thorough => (2_000_000, 10, 60_000),
        };
        Self {
            fallback_enabled: true,
            max_evaluations,
            max_restarts,
            time_limit_ms,
            seed: None,
        }
    }

    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_ms > 0).then(|| Duration::from_millis(self.time_limit_ms))
    }

    /// Builder: Set fallback_enabled
    pub fn fallback_enabled(mut self, v: bool) -> Self {
        self.fallback_enabled = v;
        self
    }

    /// Builder: Set max_evaluations
    pub fn max_evaluations(mut self, v: u64) -> Self {
        self.max_evaluations = v;
        self
    }

    /// Builder: Set max_restarts
    pub fn max_restarts(mut self, v: u32) -> Self {
        self.max_restarts = v;
        self
    }

    /// Builder: Set time_limit_ms
    pub fn time_limit_ms(mut self, v: u64) -> Self {
        self.time_limit_ms = v;
        self
    }

    /// Builder: Set seed
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = Some(v);
        self
    }
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl Validatable for LocalSearchConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_evaluations == 0 || self.max_evaluations > 100_000_000 {
            return Err(ConfigError::range_with_hint(
                "max_evaluations",
                self.max_evaluations,
                1,
                100_000_000,
                "Local search needs a finite, positive evaluation budget",
            ));
        }

        if self.max_restarts > 1_000 {
            return Err(ConfigError::range_with_hint(
                "max_restarts",
                self.max_restarts,
                0,
                1_000,
                "Restarts repeat the whole search; keep them bounded",
            ));
        }

        if self.time_limit_ms > 600_000 {
            return Err(ConfigError::range_with_hint(
                "time_limit_ms",
                self.time_limit_ms,
                0,
                600_000,
                "Use 0 for no wall-clock cutoff",
            ));
        }

        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "local_search"
    }
}

// ============================================================================
// Exploration driver
// ============================================================================

/// Branch selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPolicy {
    /// Cheapest constraint systems first, single-polarity locations only
    Ranked,
    /// Every branch, in encountered order
    NegateAllInOrder,
    /// Every branch, shuffled
    NegateAllShuffled,
}

impl RankingPolicy {
    pub fn is_ranked(&self) -> bool {
        matches!(self, Self::Ranked)
    }
}

/// Path exploration driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationConfig {
    /// Branch selection policy
    pub ranking: RankingPolicy,

    /// Failed attempts per branch location before it is dropped (1..=100)
    pub max_attempts_per_branch: u32,

    /// Solved-query LRU capacity (0 disables the cache)
    pub query_cache_capacity: usize,

    /// Skip reduced queries that already produced an input or proved unsat
    pub skip_seen_paths: bool,
}

impl ExplorationConfig {
    pub const FIELDS: &'static [&'static str] = &[
        "ranking",
        "max_attempts_per_branch",
        "query_cache_capacity",
        "skip_seen_paths",
    ];

    pub fn from_preset(preset: Preset) -> Self {
        let (max_attempts_per_branch, query_cache_capacity) = match preset {
            Preset::Fast => (1, 256),
            Preset::Balanced | Preset::Custom => (3, 1_024),
            Preset::Thorough => (10, 4_096),
        };
        Self {
            ranking: RankingPolicy::Ranked,
            max_attempts_per_branch,
            query_cache_capacity,
            skip_seen_paths: true,
        }
    }

    /// Builder: Set ranking
    pub fn ranking(mut self, v: RankingPolicy) -> Self {
        self.ranking = v;
        self
    }

    /// Builder: Set max_attempts_per_branch
    pub fn max_attempts_per_branch(mut self, v: u32) -> Self {
        self.max_attempts_per_branch = v;
        self
    }

    /// Builder: Set query_cache_capacity
    pub fn query_cache_capacity(mut self, v: usize) -> Self {
        self.query_cache_capacity = v;
        self
    }

    /// Builder: Set skip_seen_paths
    pub fn skip_seen_paths(mut self, v: bool) -> Self {
        self.skip_seen_paths = v;
        self
    }
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl Validatable for ExplorationConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_attempts_per_branch == 0 || self.max_attempts_per_branch > 100 {
            return Err(ConfigError::range_with_hint(
                "max_attempts_per_branch",
                self.max_attempts_per_branch,
                1,
                100,
                "Each branch needs at least one attempt",
            ));
        }

        if self.query_cache_capacity > 1_000_000 {
            return Err(ConfigError::range_with_hint(
                "query_cache_capacity",
                self.query_cache_capacity,
                0,
                1_000_000,
                "Use 0 to disable the query cache",
            ));
        }

        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "exploration"
    }
}

// ============================================================================
// Search budget
// ============================================================================

/// Unit of the overall search budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetUnit {
    /// `limit` is milliseconds of wall-clock time
    WallClock,
    /// `limit` is the number of generated inputs
    Individuals,
}

/// Overall search budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    pub unit: BudgetUnit,
    pub limit: u64,
}

impl BudgetConfig {
    pub const FIELDS: &'static [&'static str] = &["unit", "limit"];

    pub fn from_preset(preset: Preset) -> Self {
        let limit = match preset {
            Preset::Fast => 10_000,
            Preset::Balanced | Preset::Custom => 60_000,
            Preset::Thorough => 600_000,
        };
        Self {
            unit: BudgetUnit::WallClock,
            limit,
        }
    }

    /// Builder: Set unit
    pub fn unit(mut self, v: BudgetUnit) -> Self {
        self.unit = v;
        self
    }

    /// Builder: Set limit
    pub fn limit(mut self, v: u64) -> Self {
        self.limit = v;
        self
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl Validatable for BudgetConfig {
    fn validate(&self) -> ConfigResult<()> {
        let max = match self.unit {
            BudgetUnit::WallClock => 86_400_000,
            BudgetUnit::Individuals => 10_000_000,
        };
        if self.limit == 0 || self.limit > max {
            return Err(ConfigError::range_with_hint(
                "limit",
                self.limit,
                1,
                max,
                "Budget must be positive (milliseconds or individuals)",
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "budget"
    }
}
