//! Configuration error types

use super::preset::Preset;
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Numeric field outside its accepted range
    #[error("Invalid range for field '{field}': {value} not in {min}..={max}. {hint}")]
    Range {
        field: String,
        value: String,
        min: String,
        max: String,
        hint: String,
    },

    /// Unknown key in a YAML section
    #[error("Unknown field '{field}' in section '{section}'.{}", suggestion_text(.suggestion, .valid_fields))]
    UnknownField {
        field: String,
        section: String,
        suggestion: Option<String>,
        valid_fields: Vec<String>,
    },

    #[error("Missing 'version' field in configuration file. Add 'version: 1' to the top of your YAML file.")]
    MissingVersion,

    #[error("Unsupported configuration version {found}. Supported versions: {}", join_versions(.supported))]
    UnsupportedVersion { found: u32, supported: Vec<u32> },

    #[error("Unknown preset '{0}'. Valid presets: {}", Preset::names())]
    UnknownPreset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Cross-field or free-form validation failure
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    pub fn range_with_hint(
        field: impl Into<String>,
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
        hint: impl Into<String>,
    ) -> Self {
        Self::Range {
            field: field.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
            hint: hint.into(),
        }
    }

    /// Unknown-field error, suggesting the closest valid name when it is a plausible typo
    pub fn unknown_field(field: &str, section: &str, valid: &[&str]) -> Self {
        Self::UnknownField {
            field: field.to_string(),
            section: section.to_string(),
            suggestion: closest_name(field, valid).map(str::to_string),
            valid_fields: valid.iter().map(|f| f.to_string()).collect(),
        }
    }
}

fn suggestion_text(suggestion: &Option<String>, valid: &[String]) -> String {
    match suggestion {
        Some(name) => format!(" Did you mean '{}'?", name),
        None if valid.is_empty() => String::new(),
        None => format!(" Valid fields: {}", valid.join(", ")),
    }
}

fn join_versions(versions: &[u32]) -> String {
    versions
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Closest candidate within a third of the typed name's length (at least 2 edits)
fn closest_name<'a>(typed: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let allowed = (typed.chars().count() / 3).max(2);
    candidates
        .iter()
        .map(|c| (edit_distance(typed, c), *c))
        .filter(|(d, _)| *d <= allowed)
        .min_by_key(|(d, _)| *d)
        .map(|(_, c)| c)
}

/// Levenshtein distance, single-row
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = (above + 1)
                .min(row[j] + 1)
                .min(diagonal + usize::from(ca != *cb));
            diagonal = above;
        }
    }

    row[b.len()]
}
