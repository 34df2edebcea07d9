//! Configuration I/O (YAML loading)
//!
//! Defines the YAML schema types. Loading and export live in dse_config.rs.

use super::error::{ConfigError, ConfigResult};
use super::stage_configs::*;
use serde::{Deserialize, Serialize};

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    /// Base preset
    pub preset: String,

    /// Section overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ConfigOverrides>,
}

/// Configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_search: Option<LocalSearchConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exploration: Option<ExplorationConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetConfig>,
}

const SECTIONS: &[(&str, &[&str])] = &[
    ("solver", SolverConfig::FIELDS),
    ("local_search", LocalSearchConfig::FIELDS),
    ("exploration", ExplorationConfig::FIELDS),
    ("budget", BudgetConfig::FIELDS),
];

/// Parse a v1 document, reporting schema problems with targeted errors
/// before serde's generic ones.
pub fn parse_v1(content: &str) -> ConfigResult<ConfigExportV1> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)?;

    match raw.get("version") {
        None => return Err(ConfigError::MissingVersion),
        Some(v) => {
            let found = v.as_u64().ok_or_else(|| {
                ConfigError::Validation(format!("'version' must be an integer, got {:?}", v))
            })?;
            if found != 1 {
                return Err(ConfigError::UnsupportedVersion {
                    found: u32::try_from(found).unwrap_or(u32::MAX),
                    supported: vec![1],
                });
            }
        }
    }

    if let Some(overrides) = raw.get("overrides").and_then(|o| o.as_mapping()) {
        for (section, body) in overrides {
            let Some(section) = section.as_str() else {
                continue;
            };
            let valid = SECTIONS
                .iter()
                .find(|(name, _)| *name == section)
                .map(|(_, fields)| *fields);
            let Some(valid) = valid else {
                let names: Vec<&str> = SECTIONS.iter().map(|(n, _)| *n).collect();
                return Err(ConfigError::unknown_field(section, "overrides", &names));
            };
            if let Some(body) = body.as_mapping() {
                for key in body.keys().filter_map(|k| k.as_str()) {
                    if !valid.contains(&key) {
                        return Err(ConfigError::unknown_field(key, section, valid));
                    }
                }
            }
        }
    }

    Ok(serde_yaml::from_value(raw)?)
}
