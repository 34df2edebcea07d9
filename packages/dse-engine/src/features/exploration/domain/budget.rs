//! Search budgets
//!
//! Checked cooperatively between solve attempts, never mid-solve.

use crate::config::{BudgetConfig, BudgetUnit};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Overall exploration budget shared by concurrent drivers
pub trait SearchBudget: Send + Sync + std::fmt::Debug {
    fn is_exhausted(&self) -> bool;

    /// Called once per generated input
    fn record_individual(&self) {}
}

/// Stops after a fixed amount of wall-clock time since creation
#[derive(Debug)]
pub struct WallClockBudget {
    started: Instant,
    limit: Duration,
}

impl WallClockBudget {
    pub fn new(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.started.elapsed())
    }
}

impl SearchBudget for WallClockBudget {
    fn is_exhausted(&self) -> bool {
        self.started.elapsed() >= self.limit
    }
}

/// Stops after a number of generated inputs
#[derive(Debug)]
pub struct IndividualsBudget {
    produced: AtomicU64,
    limit: u64,
}

impl IndividualsBudget {
    pub fn new(limit: u64) -> Self {
        Self {
            produced: AtomicU64::new(0),
            limit,
        }
    }

    pub fn produced(&self) -> u64 {
        self.produced.load(Ordering::Relaxed)
    }
}

impl SearchBudget for IndividualsBudget {
    fn is_exhausted(&self) -> bool {
        self.produced() >= self.limit
    }

    fn record_individual(&self) {
        self.produced.fetch_add(1, Ordering::Relaxed);
    }
}

/// Never exhausted
#[derive(Debug, Default)]
pub struct UnlimitedBudget;

impl SearchBudget for UnlimitedBudget {
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Budget described by `config`, started now
pub fn budget_from_config(config: &BudgetConfig) -> Arc<dyn SearchBudget> {
    match config.unit {
        BudgetUnit::WallClock => Arc::new(WallClockBudget::new(Duration::from_millis(config.limit))),
        BudgetUnit::Individuals => Arc::new(IndividualsBudget::new(config.limit)),
    }
}
