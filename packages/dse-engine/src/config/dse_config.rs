//! Engine configuration builder
//!
//! Preset → closure overrides → `build()` producing an immutable
//! [`ValidatedConfig`]. YAML files feed the same builder.

use super::error::ConfigResult;
use super::io::{parse_v1, ConfigExportV1, ConfigOverrides};
use super::preset::Preset;
use super::provenance::{ConfigProvenance, ConfigSource, Section};
use super::stage_configs::{BudgetConfig, ExplorationConfig, LocalSearchConfig, SolverConfig};
use super::validation::{CrossSectionValidator, ValidatableCollection};

/// Engine configuration (builder)
#[derive(Debug, Clone)]
pub struct DseConfig {
    /// Base preset
    pub(crate) preset: Preset,

    /// Section overrides
    pub(crate) solver: Option<SolverConfig>,
    pub(crate) local_search: Option<LocalSearchConfig>,
    pub(crate) exploration: Option<ExplorationConfig>,
    pub(crate) budget: Option<BudgetConfig>,

    /// Provenance tracking (section-level)
    pub(crate) provenance: ConfigProvenance,
}

impl DseConfig {
    /// Level 1: Create from preset
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            solver: None,
            local_search: None,
            exploration: None,
            budget: None,
            provenance: ConfigProvenance::from_preset(preset),
        }
    }

    /// Level 2: Override the solver section
    ///
    /// The closure receives the current override if one exists, else the preset defaults.
    pub fn solver<F>(mut self, f: F) -> Self
    where
        F: FnOnce(SolverConfig) -> SolverConfig,
    {
        let base = self.effective_solver();
        self.solver = Some(f(base));
        self.provenance.record(Section::Solver, ConfigSource::Builder);
        self
    }

    /// Level 2: Override the local search section
    pub fn local_search<F>(mut self, f: F) -> Self
    where
        F: FnOnce(LocalSearchConfig) -> LocalSearchConfig,
    {
        let base = self.effective_local_search();
        self.local_search = Some(f(base));
        self.provenance
            .record(Section::LocalSearch, ConfigSource::Builder);
        self
    }

    /// Level 2: Override the exploration section
    pub fn exploration<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ExplorationConfig) -> ExplorationConfig,
    {
        let base = self.effective_exploration();
        self.exploration = Some(f(base));
        self.provenance
            .record(Section::Exploration, ConfigSource::Builder);
        self
    }

    /// Level 2: Override the budget section
    pub fn budget<F>(mut self, f: F) -> Self
    where
        F: FnOnce(BudgetConfig) -> BudgetConfig,
    {
        let base = self.effective_budget();
        self.budget = Some(f(base));
        self.provenance.record(Section::Budget, ConfigSource::Builder);
        self
    }

    /// Build and validate
    pub fn build(self) -> ConfigResult<ValidatedConfig> {
        // Step 1: Validate individual sections
        self.solver.validate_all()?;
        self.local_search.validate_all()?;
        self.exploration.validate_all()?;
        self.budget.validate_all()?;

        // Step 2: Cross-section validation
        CrossSectionValidator::validate(&self)?;

        Ok(ValidatedConfig {
            solver: self.effective_solver(),
            local_search: self.effective_local_search(),
            exploration: self.effective_exploration(),
            budget: self.effective_budget(),
            inner: self,
        })
    }

    pub(crate) fn effective_solver(&self) -> SolverConfig {
        self.solver
            .clone()
            .unwrap_or_else(|| SolverConfig::from_preset(self.preset))
    }

    pub(crate) fn effective_local_search(&self) -> LocalSearchConfig {
        self.local_search
            .clone()
            .unwrap_or_else(|| LocalSearchConfig::from_preset(self.preset))
    }

    pub(crate) fn effective_exploration(&self) -> ExplorationConfig {
        self.exploration
            .clone()
            .unwrap_or_else(|| ExplorationConfig::from_preset(self.preset))
    }

    pub(crate) fn effective_budget(&self) -> BudgetConfig {
        self.budget
            .clone()
            .unwrap_or_else(|| BudgetConfig::from_preset(self.preset))
    }

    pub fn get_preset(&self) -> Preset {
        self.preset
    }

    pub fn provenance(&self) -> &ConfigProvenance {
        &self.provenance
    }

    /// Load from YAML file (v1 schema)
    pub fn from_yaml(path: &str) -> ConfigResult<ValidatedConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content, path)?.build()
    }

    /// Parse a v1 document without validating it; `origin` is recorded as provenance
    pub fn from_yaml_str(content: &str, origin: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = parse_v1(content)?;

        let preset: Preset = export.preset.parse()?;

        let mut config = Self::preset(preset);
        let source = || ConfigSource::Yaml {
            path: origin.to_string(),
        };

        if let Some(overrides) = export.overrides {
            if let Some(solver) = overrides.solver {
                config.solver = Some(solver);
                config.provenance.record(Section::Solver, source());
            }
            if let Some(local_search) = overrides.local_search {
                config.local_search = Some(local_search);
                config.provenance.record(Section::LocalSearch, source());
            }
            if let Some(exploration) = overrides.exploration {
                config.exploration = Some(exploration);
                config.provenance.record(Section::Exploration, source());
            }
            if let Some(budget) = overrides.budget {
                config.budget = Some(budget);
                config.provenance.record(Section::Budget, source());
            }
        }

        tracing::debug!(preset = %preset, origin, "loaded configuration");
        Ok(config)
    }

    /// Export to YAML
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: 1,
            preset: self.preset.to_string(),
            overrides: Some(ConfigOverrides {
                solver: self.solver.clone(),
                local_search: self.local_search.clone(),
                exploration: self.exploration.clone(),
                budget: self.budget.clone(),
            }),
        };

        Ok(serde_yaml::to_string(&export)?)
    }
}

/// Validated configuration (immutable, safe to share)
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    inner: DseConfig,
    solver: SolverConfig,
    local_search: LocalSearchConfig,
    exploration: ExplorationConfig,
    budget: BudgetConfig,
}

impl ValidatedConfig {
    /// Unwrap to the builder for further overrides
    pub fn into_inner(self) -> DseConfig {
        self.inner
    }

    pub fn as_inner(&self) -> &DseConfig {
        &self.inner
    }

    pub fn solver(&self) -> &SolverConfig {
        &self.solver
    }

    pub fn local_search(&self) -> &LocalSearchConfig {
        &self.local_search
    }

    pub fn exploration(&self) -> &ExplorationConfig {
        &self.exploration
    }

    pub fn budget(&self) -> &BudgetConfig {
        &self.budget
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        self.inner.to_yaml()
    }

    /// Multi-line summary for CLI output
    pub fn summary(&self) -> String {
        let solver = match &self.solver.executable {
            Some(path) => format!("{} (timeout {} ms)", path.display(), self.solver.timeout_ms),
            None => "none (local search only)".to_string(),
        };
        let lines = [
            format!("Preset: {}", self.inner.preset),
            format!("Solver: {}", solver),
            format!(
                "Local search: fallback={}, max_evaluations={}, max_restarts={}",
                self.local_search.fallback_enabled,
                self.local_search.max_evaluations,
                self.local_search.max_restarts
            ),
            format!(
                "Exploration: ranking={:?}, max_attempts_per_branch={}, cache={}",
                self.exploration.ranking,
                self.exploration.max_attempts_per_branch,
                self.exploration.query_cache_capacity
            ),
            format!("Budget: {:?} {}", self.budget.unit, self.budget.limit),
            self.inner.provenance.summary(),
        ];
        lines.join("\n")
    }
}

impl Default for ValidatedConfig {
    fn default() -> Self {
        let inner = DseConfig::preset(Preset::default());
        Self {
            solver: inner.effective_solver(),
            local_search: inner.effective_local_search(),
            exploration: inner.effective_exploration(),
            budget: inner.effective_budget(),
            inner,
        }
    }
}
