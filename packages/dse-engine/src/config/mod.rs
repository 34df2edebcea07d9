//! Configuration System
//!
//! Three tiers:
//! - Level 1: Preset - one-liner
//! - Level 2: Section override - closure adjusting one section
//! - Level 3: YAML v1 - complete control
//!
//! # Examples
//!
//! ```rust,ignore
//! use dse_engine::config::{DseConfig, Preset};
//!
//! let config = DseConfig::preset(Preset::Fast).build()?;
//!
//! let config = DseConfig::preset(Preset::Balanced)
//!     .solver(|c| c.executable("/usr/bin/z3").timeout_ms(2_000))
//!     .build()?;
//!
//! let config = DseConfig::from_yaml("nightly-dse.yaml")?;
//! ```

pub mod dse_config;
pub mod error;
pub mod io;
pub mod preset;
pub mod provenance;
pub mod stage_configs;
pub mod validation;

// Re-exports
pub use dse_config::{DseConfig, ValidatedConfig};
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, ConfigOverrides};
pub use preset::Preset;
pub use provenance::{ConfigProvenance, ConfigSource, Section};
pub use stage_configs::{
    BudgetConfig, BudgetUnit, ExplorationConfig, LocalSearchConfig, RankingPolicy, SolverConfig,
};
pub use validation::{CrossSectionValidator, Validatable, ValidatableCollection};
