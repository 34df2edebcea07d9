//! Path exploration driver
//!
//! One driver explores path conditions one at a time. For every candidate
//! branch (best-ranked first) it:
//!
//! 1. stops if the search budget is spent or exploration was cancelled
//! 2. skips locations past the retry bound, known unsolvable, or already
//!    covered with the wanted polarity
//! 3. reduces the reaching constraints to the target's cone of influence
//! 4. answers cached queries from the query cache, skips other queries
//!    that already produced an input or proved unsat earlier in the run
//! 5. runs the solve chain and patches the base input with the model
//!
//! Failures of any kind only bump the location's attempt counter.

use super::solve_chain::SolveChain;
use crate::config::ValidatedConfig;
use crate::errors::DseError;
use crate::features::exploration::domain::{
    budget_from_config, ExplorationStats, SearchBudget, TestInput,
};
use crate::features::exploration::infrastructure::{
    cone_of_influence, rank_candidates, QueryCache, QueryFingerprint,
};
use crate::features::solver::infrastructure::render_query;
use crate::features::solver::{SolverResult, UnknownReason};
use crate::features::symbolic::domain::{BranchLocation, Constraint, Model, PathCondition};
use ahash::{AHashMap, AHashSet};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A new input aimed at the other side of one branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedInput {
    pub input: TestInput,
    pub target: BranchLocation,
    /// Polarity the new input should take at `target`
    pub polarity: bool,
    pub model: Model,
    /// Decisions the new execution should reproduce, ending with the flipped one
    pub expected_prefix: Vec<(BranchLocation, bool)>,
}

/// Outcome of exploring one path condition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplorationReport {
    pub generated: Vec<GeneratedInput>,
    pub stats: ExplorationStats,
    pub unsolvable: Vec<BranchLocation>,
}

/// Per-driver state carried across explored paths
#[derive(Debug)]
struct DriverState {
    attempts: AHashMap<BranchLocation, u32>,
    unsolvable: BTreeSet<BranchLocation>,
    covered: AHashSet<(BranchLocation, bool)>,
    seen_queries: AHashSet<QueryFingerprint>,
    cache: QueryCache,
    stats: ExplorationStats,
    rng: StdRng,
}

#[derive(Debug)]
pub struct Driver {
    config: Arc<ValidatedConfig>,
    chain: Arc<SolveChain>,
    budget: Arc<dyn SearchBudget>,
    cancel: CancellationToken,
    state: DriverState,
}

impl Driver {
    /// Build the solver chain from `config`; fails only on misconfiguration
    pub fn new(config: ValidatedConfig) -> Result<Self, DseError> {
        let chain = SolveChain::from_config(&config)?;
        let budget = budget_from_config(config.budget());
        Ok(Self::from_parts(
            Arc::new(config),
            Arc::new(chain),
            budget,
            CancellationToken::new(),
        ))
    }

    /// Driver over shared parts (one per concurrent exploration)
    pub fn from_parts(
        config: Arc<ValidatedConfig>,
        chain: Arc<SolveChain>,
        budget: Arc<dyn SearchBudget>,
        cancel: CancellationToken,
    ) -> Self {
        let rng = match config.local_search().seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = DriverState {
            attempts: AHashMap::new(),
            unsolvable: BTreeSet::new(),
            covered: AHashSet::new(),
            seen_queries: AHashSet::new(),
            cache: QueryCache::new(config.exploration().query_cache_capacity),
            stats: ExplorationStats::default(),
            rng,
        };
        Self {
            config,
            chain,
            budget,
            cancel,
            state,
        }
    }

    pub fn with_budget(mut self, budget: Arc<dyn SearchBudget>) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Totals over every path explored by this driver
    pub fn stats(&self) -> &ExplorationStats {
        &self.state.stats
    }

    pub fn unsolvable(&self) -> &BTreeSet<BranchLocation> {
        &self.state.unsolvable
    }

    pub fn attempts_at(&self, location: &BranchLocation) -> u32 {
        self.state.attempts.get(location).copied().unwrap_or(0)
    }

    fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || self.budget.is_exhausted()
    }

    /// Reduced constraint system for negating branch `index`
    pub fn reduced_query(path: &PathCondition, index: usize) -> Option<Vec<Constraint>> {
        let branch = path.get(index)?;
        Some(cone_of_influence(
            &path.reaching_constraints(index),
            &branch.flipped_constraint(),
        ))
    }

    /// SMT-LIB text the external solver would receive for branch `index`
    pub fn query_text(&self, path: &PathCondition, index: usize) -> Result<String, DseError> {
        let constraints = Self::reduced_query(path, index).ok_or_else(|| {
            DseError::misconfiguration(format!(
                "branch index {} out of range (path has {} branches)",
                index,
                path.len()
            ))
        })?;
        render_query(&constraints, self.config.solver().add_variable_bounds)
            .map_err(|e| DseError::Solver(e.to_string()))
    }

    /// Explore every candidate branch of `path`, producing patched copies of `input`
    #[tracing::instrument(skip_all, fields(input = %input.name, branches = path.len()))]
    pub async fn explore(&mut self, input: &TestInput, path: &PathCondition) -> ExplorationReport {
        let exploration = self.config.exploration().clone();
        let prior = path.concrete_model();
        let order = rank_candidates(
            path,
            exploration.ranking,
            &self.state.unsolvable,
            &mut self.state.rng,
        );

        let mut stats = ExplorationStats::default();
        let mut generated = Vec::new();
        let mut unsolvable = Vec::new();

        for index in order {
            if self.should_stop() {
                tracing::debug!("search budget exhausted or exploration cancelled");
                break;
            }
            let Some(branch) = path.get(index) else {
                continue;
            };
            let location = branch.location.clone();
            let polarity = !branch.taken;

            if self.state.unsolvable.contains(&location)
                || self.state.covered.contains(&(location.clone(), polarity))
            {
                continue;
            }
            if self.attempts_at(&location) >= exploration.max_attempts_per_branch {
                stats.skipped_retry_bound += 1;
                continue;
            }

            let target = branch.flipped_constraint();
            if !target.is_solvable() {
                tracing::debug!(location = %location, "target has no free variables");
                self.state.unsolvable.insert(location.clone());
                unsolvable.push(location);
                continue;
            }

            let reduced = cone_of_influence(&path.reaching_constraints(index), &target);
            let fingerprint = QueryFingerprint::of(&reduced);
            let cached = self.state.cache.get(&fingerprint, &reduced);
            if cached.is_none()
                && exploration.skip_seen_paths
                && self.state.seen_queries.contains(&fingerprint)
            {
                stats.skipped_seen += 1;
                continue;
            }

            stats.attempts += 1;
            stats.constraints_total += reduced.len() as u64;

            let result = match cached {
                Some(cached) => {
                    stats.cache_hits += 1;
                    cached.completed_from(&prior)
                }
                None => {
                    let outcome = self.chain.solve(&reduced, &prior).await;
                    stats.solver_calls += u64::from(outcome.solver_calls);
                    stats.local_search_calls += u64::from(outcome.local_search_calls);
                    self.state.cache.record(fingerprint, &outcome.result);
                    outcome.result
                }
            };
            let proven_unsat = matches!(result, SolverResult::Unsat);

            let produced = match result {
                SolverResult::Sat(model) => match input.patched(&model) {
                    Ok(patched) => Some(GeneratedInput {
                        input: patched,
                        target: location.clone(),
                        polarity,
                        model,
                        expected_prefix: path.expected_prefix(index),
                    }),
                    Err(e) => {
                        tracing::debug!(location = %location, error = %e, "model does not fit input");
                        None
                    }
                },
                other => {
                    record_failure(&mut stats, &other, &location);
                    None
                }
            };

            // failed attempts stay retryable up to the retry bound
            if proven_unsat || produced.is_some() {
                self.state.seen_queries.insert(fingerprint);
            }

            match produced {
                Some(new_input) => {
                    tracing::debug!(location = %location, polarity, "generated input");
                    stats.successes += 1;
                    self.state.covered.insert((location, polarity));
                    self.budget.record_individual();
                    generated.push(new_input);
                }
                None => {
                    stats.failures += 1;
                    *self.state.attempts.entry(location).or_insert(0) += 1;
                }
            }
        }

        self.state.stats.merge(&stats);
        tracing::info!(
            generated = generated.len(),
            attempts = stats.attempts,
            failures = stats.failures,
            "path explored"
        );

        ExplorationReport {
            generated,
            stats,
            unsolvable,
        }
    }
}

fn record_failure(stats: &mut ExplorationStats, result: &SolverResult, location: &BranchLocation) {
    match result {
        SolverResult::Sat(_) => {}
        SolverResult::Unsat => stats.unsat += 1,
        SolverResult::Unknown(UnknownReason::Timeout) => stats.timeouts += 1,
        SolverResult::Unknown(UnknownReason::LocalSearchExhausted) => {
            stats.local_search_exhausted += 1
        }
        SolverResult::Unknown(UnknownReason::Incomplete) => {}
        SolverResult::Error(message) => {
            stats.solver_errors += 1;
            tracing::warn!(location = %location, error = %message, "solver error");
        }
        SolverResult::ParseError { raw, message } => {
            stats.parse_errors += 1;
            tracing::warn!(location = %location, error = %message, raw = %raw, "unparseable solver output");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DseConfig, Preset, RankingPolicy};
    use crate::features::exploration::domain::PrimitiveValue;
    use crate::features::symbolic::domain::{BranchCondition, Expression, Variable};

    fn local_only(max_attempts: u32) -> ValidatedConfig {
        DseConfig::preset(Preset::Fast)
            .solver(|c| c.no_executable())
            .local_search(|c| c.seed(5))
            .exploration(|c| {
                c.ranking(RankingPolicy::NegateAllInOrder)
                    .max_attempts_per_branch(max_attempts)
            })
            .build()
            .unwrap()
    }

    fn branch(index: u32, constraint: Constraint, taken: bool) -> BranchCondition {
        BranchCondition::new(BranchLocation::new("m", index), constraint, taken)
    }

    fn x() -> Expression {
        Expression::var(Variable::int("x", 5))
    }

    #[tokio::test]
    async fn test_flip_equality_branch() {
        let path = PathCondition::new(vec![
            branch(1, Constraint::lt(x(), Expression::int(0)), false),
            branch(2, Constraint::eq(x(), Expression::int(5)), true),
        ]);
        let input = TestInput::new("t").with_slot("x", PrimitiveValue::Int(5));
        let mut driver = Driver::new(local_only(2)).unwrap();

        let report = driver.explore(&input, &path).await;
        let flipped = report
            .generated
            .iter()
            .find(|g| g.target == BranchLocation::new("m", 2))
            .expect("branch 2 flipped");
        let Some(PrimitiveValue::Int(v)) = flipped.input.slot("x") else {
            panic!("x slot missing");
        };
        assert!(*v >= 0 && *v != 5);
        assert!(!flipped.polarity);
    }

    #[tokio::test]
    async fn test_constant_branch_marked_unsolvable() {
        let path = PathCondition::new(vec![branch(
            3,
            Constraint::eq(Expression::int(1), Expression::int(1)),
            true,
        )]);
        let input = TestInput::new("t").with_slot("x", PrimitiveValue::Int(0));
        let mut driver = Driver::new(local_only(2)).unwrap();

        let report = driver.explore(&input, &path).await;
        assert!(report.generated.is_empty());
        assert_eq!(report.unsolvable, vec![BranchLocation::new("m", 3)]);
        assert!(driver.unsolvable().contains(&BranchLocation::new("m", 3)));
    }

    #[tokio::test]
    async fn test_retry_bound() {
        // flipping branch 2 needs x <= 10 && x > 10
        let path = PathCondition::new(vec![
            branch(1, Constraint::gt(x(), Expression::int(10)), false),
            branch(2, Constraint::le(x(), Expression::int(10)), true),
        ]);
        let input = TestInput::new("t").with_slot("x", PrimitiveValue::Int(5));
        let config = DseConfig::preset(Preset::Fast)
            .solver(|c| c.no_executable())
            .local_search(|c| c.seed(5).max_evaluations(500))
            .exploration(|c| {
                c.ranking(RankingPolicy::NegateAllInOrder)
                    .max_attempts_per_branch(1)
                    .skip_seen_paths(false)
                    .query_cache_capacity(0)
            })
            .build()
            .unwrap();
        let mut driver = Driver::new(config).unwrap();

        let first = driver.explore(&input, &path).await;
        let failed = BranchLocation::new("m", 2);
        assert!(first.generated.iter().all(|g| g.target != failed));
        assert_eq!(driver.attempts_at(&failed), 1);

        let second = driver.explore(&input, &path).await;
        assert!(second.stats.skipped_retry_bound >= 1);
    }

    #[tokio::test]
    async fn test_cancellation_stops_before_solving() {
        let path = PathCondition::new(vec![branch(1, Constraint::eq(x(), Expression::int(5)), true)]);
        let input = TestInput::new("t").with_slot("x", PrimitiveValue::Int(5));
        let mut driver = Driver::new(local_only(2)).unwrap();
        driver.cancellation_token().cancel();

        let report = driver.explore(&input, &path).await;
        assert_eq!(report.stats.attempts, 0);
    }

    #[test]
    fn test_query_text() {
        let path = PathCondition::new(vec![branch(1, Constraint::eq(x(), Expression::int(5)), true)]);
        let driver = Driver::new(local_only(1)).unwrap();
        let query = driver.query_text(&path, 0).unwrap();
        assert!(query.contains("(assert (not (= x 5)))"));
        assert!(driver.query_text(&path, 4).is_err());
    }
}
