//! Configuration validation
//!
//! Section configs implement `Validatable`; `DseConfig::build()` drives them
//! and then runs the cross-section checks in `CrossSectionValidator`.

use super::dse_config::DseConfig;
use super::error::{ConfigError, ConfigResult};
use super::stage_configs::BudgetUnit;

// ═══════════════════════════════════════════════════════════════════════════
// Validatable Trait
// ═══════════════════════════════════════════════════════════════════════════

/// Trait for validatable configuration objects
///
/// # Example
/// ```rust,ignore
/// use dse_engine::config::Validatable;
///
/// fn check<C: Validatable>(config: &C) -> Result<(), ConfigError> {
///     config.validate()
/// }
/// ```
pub trait Validatable {
    /// Validate the configuration
    ///
    /// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid.
    fn validate(&self) -> ConfigResult<()>;

    /// Get the configuration name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}

/// Extension trait for validating collections of configs
pub trait ValidatableCollection {
    /// Validate all configs in collection
    fn validate_all(&self) -> ConfigResult<()>;
}

impl<T: Validatable> ValidatableCollection for Option<T> {
    fn validate_all(&self) -> ConfigResult<()> {
        if let Some(config) = self {
            config.validate()?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Cross-section checks
// ═══════════════════════════════════════════════════════════════════════════

/// Checks that span more than one section
pub struct CrossSectionValidator;

impl CrossSectionValidator {
    pub fn validate(config: &DseConfig) -> ConfigResult<()> {
        let solver = config.effective_solver();
        let local_search = config.effective_local_search();
        let budget = config.effective_budget();

        if solver.executable.is_none() && solver.add_variable_bounds {
            tracing::warn!("add_variable_bounds has no effect without a solver executable");
        }

        if budget.unit == BudgetUnit::WallClock && budget.limit < solver.timeout_ms {
            tracing::warn!(
                budget_ms = budget.limit,
                solver_timeout_ms = solver.timeout_ms,
                "search budget is shorter than a single solver call"
            );
        }

        if budget.unit == BudgetUnit::WallClock
            && local_search.time_limit_ms > 0
            && local_search.time_limit_ms > budget.limit
        {
            return Err(ConfigError::Validation(format!(
                "local_search.time_limit_ms ({}) exceeds the wall-clock budget ({} ms)",
                local_search.time_limit_ms, budget.limit
            )));
        }

        Ok(())
    }
}
