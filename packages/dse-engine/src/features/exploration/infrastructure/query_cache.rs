//! Query fingerprints and the LRU cache of decided queries
//!
//! A fingerprint is the Blake3 hash of the sorted, deduplicated textual form
//! of a constraint set, so order and duplicates do not matter.

use crate::features::solver::ports::SolverResult;
use crate::features::symbolic::domain::{Constraint, Model};
use lru::LruCache;
use std::fmt;
use std::num::NonZeroUsize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryFingerprint(blake3::Hash);

impl QueryFingerprint {
    pub fn of(constraints: &[Constraint]) -> Self {
        let mut lines: Vec<String> = constraints.iter().map(ToString::to_string).collect();
        lines.sort();
        lines.dedup();

        let mut hasher = blake3::Hasher::new();
        for line in &lines {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        Self(hasher.finalize())
    }
}

impl fmt::Display for QueryFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_hex()[..16])
    }
}

#[derive(Debug, Clone)]
enum Decided {
    Sat(Model),
    Unsat,
}

/// LRU cache of SAT models and UNSAT verdicts; capacity 0 disables it
pub struct QueryCache {
    cache: Option<LruCache<QueryFingerprint, Decided>>,
    hits: u64,
    misses: u64,
}

impl QueryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: NonZeroUsize::new(capacity).map(LruCache::new),
            hits: 0,
            misses: 0,
        }
    }

    /// Cached answer for `constraints`; a stale model that no longer satisfies them is dropped
    pub fn get(&mut self, fingerprint: &QueryFingerprint, constraints: &[Constraint]) -> Option<SolverResult> {
        let cache = self.cache.as_mut()?;
        let (answer, stale) = match cache.get(fingerprint) {
            Some(Decided::Sat(model)) if model.satisfies(constraints) => {
                (Some(SolverResult::Sat(model.clone())), false)
            }
            Some(Decided::Sat(_)) => (None, true),
            Some(Decided::Unsat) => (Some(SolverResult::Unsat), false),
            None => (None, false),
        };
        if stale {
            cache.pop(fingerprint);
        }
        if answer.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        answer
    }

    /// Remember decided results; undecided ones are not cached
    pub fn record(&mut self, fingerprint: QueryFingerprint, result: &SolverResult) {
        let Some(cache) = self.cache.as_mut() else {
            return;
        };
        match result {
            SolverResult::Sat(model) => {
                cache.put(fingerprint, Decided::Sat(model.clone()));
            }
            SolverResult::Unsat => {
                cache.put(fingerprint, Decided::Unsat);
            }
            _ => {}
        }
    }

    pub fn len(&self) -> usize {
        self.cache.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cache hit rate (0.0-1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("len", &self.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}
