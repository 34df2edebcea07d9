//! Satisfying assignments

use super::constraint::Constraint;
use super::value::Value;
use super::variable::Variable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Variable name → concrete value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model(BTreeMap<String, Value>);

impl Model {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Recorded values of `variables`
    pub fn from_variables<'a, I>(variables: I) -> Self
    where
        I: IntoIterator<Item = &'a Variable>,
    {
        variables
            .into_iter()
            .map(|v| (v.name.clone(), v.concrete.clone()))
            .collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Copy every entry of `prior` that this model lacks; existing entries win
    pub fn complete_from(&mut self, prior: &Model) {
        for (name, value) in &prior.0 {
            self.0
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }

    pub fn completed_from(mut self, prior: &Model) -> Self {
        self.complete_from(prior);
        self
    }

    /// Every constraint holds under this assignment
    pub fn satisfies(&self, constraints: &[Constraint]) -> bool {
        constraints.iter().all(|c| c.holds(self))
    }
}

impl FromIterator<(String, Value)> for Model {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Model {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self.0.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{{{}}}", entries.join(", "))
    }
}
