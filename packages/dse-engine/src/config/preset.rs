//! Exploration presets
//!
//! A preset fixes the defaults of every section; overrides refine it.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configuration preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// CI: short solver timeouts, small local-search budget
    ///
    /// - Solver: 1s per query
    /// - AVM: 20k evaluations, no restarts
    /// - Branch retries: 1
    Fast,

    /// Development: coverage vs. latency
    ///
    /// - Solver: 5s per query
    /// - AVM: 200k evaluations, 3 restarts
    /// - Branch retries: 3
    #[default]
    Balanced,

    /// Nightly: hunt for hard branches
    ///
    /// - Solver: 30s per query, variable bounds asserted
    /// - AVM: 2M evaluations, 10 restarts
    /// - Branch retries: 10
    Thorough,

    /// Balanced defaults, meant to be overridden section by section
    Custom,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Fast, Preset::Balanced, Preset::Thorough, Preset::Custom];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
            Self::Custom => "custom",
        }
    }

    /// Comma-separated preset names, for messages
    pub fn names() -> String {
        Self::ALL.map(|p| p.as_str()).join(", ")
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_case() {
        assert_eq!("FAST".parse::<Preset>().unwrap(), Preset::Fast);
        assert_eq!(" Thorough ".parse::<Preset>().unwrap(), Preset::Thorough);
        for preset in Preset::ALL {
            assert_eq!(preset.to_string().parse::<Preset>().unwrap(), preset);
        }
    }

    #[test]
    fn test_unknown_preset() {
        let err = "ludicrous".parse::<Preset>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPreset(ref name) if name == "ludicrous"));
    }

    #[test]
    fn test_default_and_names() {
        assert_eq!(Preset::default(), Preset::Balanced);
        assert_eq!(Preset::names(), "fast, balanced, thorough, custom");
    }
}
