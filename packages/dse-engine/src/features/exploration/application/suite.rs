//! Suite exploration
//!
//! Runs one driver per recorded execution concurrently. Drivers share the
//! validated configuration, the solver chain, the search budget and the
//! cancellation token; nothing else is shared.

use super::driver::{Driver, ExplorationReport};
use super::solve_chain::SolveChain;
use crate::config::ValidatedConfig;
use crate::errors::DseError;
use crate::features::exploration::domain::{budget_from_config, ExplorationStats, SearchBudget, TestInput};
use crate::features::symbolic::domain::PathCondition;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// One recorded execution: the input that ran and the branches it took
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationTask {
    pub input: TestInput,
    pub path_condition: PathCondition,
}

/// Reports in task order plus their totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub reports: Vec<ExplorationReport>,
    pub stats: ExplorationStats,
}

impl SuiteReport {
    pub fn generated_count(&self) -> usize {
        self.reports.iter().map(|r| r.generated.len()).sum()
    }
}

#[derive(Debug)]
pub struct SuiteExplorer {
    config: Arc<ValidatedConfig>,
    chain: Arc<SolveChain>,
    budget: Arc<dyn SearchBudget>,
    cancel: CancellationToken,
    max_concurrency: usize,
}

impl SuiteExplorer {
    pub fn new(config: ValidatedConfig) -> Result<Self, DseError> {
        let chain = SolveChain::from_config(&config)?;
        Ok(Self::with_chain(config, chain))
    }

    pub fn with_chain(config: ValidatedConfig, chain: SolveChain) -> Self {
        let budget = budget_from_config(config.budget());
        Self {
            config: Arc::new(config),
            chain: Arc::new(chain),
            budget,
            cancel: CancellationToken::new(),
            max_concurrency: num_cpus::get().max(1),
        }
    }

    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    pub fn with_budget(mut self, budget: Arc<dyn SearchBudget>) -> Self {
        self.budget = budget;
        self
    }

    /// Cancelling this token stops every driver before its next attempt
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    #[tracing::instrument(skip_all, fields(tasks = tasks.len(), concurrency = self.max_concurrency))]
    pub async fn explore_all(&self, tasks: Vec<ExplorationTask>) -> SuiteReport {
        let permits = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set = JoinSet::new();
        let total = tasks.len();

        for (position, task) in tasks.into_iter().enumerate() {
            let permits = Arc::clone(&permits);
            let mut driver = Driver::from_parts(
                Arc::clone(&self.config),
                Arc::clone(&self.chain),
                Arc::clone(&self.budget),
                self.cancel.clone(),
            );
            join_set.spawn(async move {
                // semaphore is never closed
                let _permit = permits.acquire_owned().await.ok();
                let report = driver.explore(&task.input, &task.path_condition).await;
                (position, report)
            });
        }

        let mut slots: Vec<Option<ExplorationReport>> = vec![None; total];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((position, report)) => slots[position] = Some(report),
                Err(e) => tracing::error!(error = %e, "exploration task failed"),
            }
        }

        let reports: Vec<ExplorationReport> = slots.into_iter().map(Option::unwrap_or_default).collect();
        let mut stats = ExplorationStats::default();
        for report in &reports {
            stats.merge(&report.stats);
        }
        tracing::info!(
            generated = reports.iter().map(|r| r.generated.len()).sum::<usize>(),
            attempts = stats.attempts,
            "suite explored"
        );

        SuiteReport { reports, stats }
    }
}
