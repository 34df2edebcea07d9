//! Where each configuration section came from.
//!
//! A section that was never overridden inherits the preset's values, so
//! only explicit overrides are stored.

use super::preset::Preset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Top-level section of a [`DseConfig`](super::DseConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Solver,
    LocalSearch,
    Exploration,
    Budget,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Solver,
        Section::LocalSearch,
        Section::Exploration,
        Section::Budget,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Solver => "solver",
            Section::LocalSearch => "local_search",
            Section::Exploration => "exploration",
            Section::Budget => "budget",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConfigSource {
    Preset(Preset),
    /// Overrides block of a YAML document; `path` is the file or `<string>`
    Yaml { path: String },
    Builder,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Preset(p) => write!(f, "preset {}", p),
            ConfigSource::Yaml { path } => write!(f, "yaml {}", path),
            ConfigSource::Builder => f.write_str("builder"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigProvenance {
    preset: Preset,
    overrides: BTreeMap<Section, ConfigSource>,
}

impl ConfigProvenance {
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            preset,
            overrides: BTreeMap::new(),
        }
    }

    /// Record that `section` was replaced; a later record wins.
    pub fn record(&mut self, section: Section, source: ConfigSource) {
        self.overrides.insert(section, source);
    }

    pub fn source_of(&self, section: Section) -> ConfigSource {
        self.overrides
            .get(&section)
            .cloned()
            .unwrap_or(ConfigSource::Preset(self.preset))
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn is_pure_preset(&self) -> bool {
        self.overrides.is_empty()
    }

    /// One line per section, e.g. `  solver: yaml nightly.yaml`
    pub fn summary(&self) -> String {
        let mut out = String::from("Sources:");
        for section in Section::ALL {
            out.push_str(&format!("\n  {}: {}", section, self.source_of(section)));
        }
        out
    }
}
