//! Regex-to-string distance
//!
//! The pattern is parsed into a `regex_syntax::hir::Hir`, compiled into a
//! Thompson NFA and scored with a shortest path over `(position, state)`:
//!
//! ```text
//! epsilon move      0
//! insert a char     1
//! delete a char     1
//! substitute        normalize(distance to nearest class bound), 0 on match
//! ```
//!
//! Look-around assertions are treated as epsilon moves.

use super::distance::normalize;
use crate::features::symbolic::domain::pattern::{bounded_cache, expand_pattern, full_match};
use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex_syntax::hir::{Class, Hir, HirKind};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

/// Upper bound on automaton size; bigger patterns get no gradient
const MAX_STATES: usize = 20_000;

static AUTOMATA: Lazy<Mutex<LruCache<String, Option<Arc<Nfa>>>>> =
    Lazy::new(|| Mutex::new(bounded_cache()));

#[derive(Debug)]
enum State {
    Char { ranges: Vec<(u32, u32)>, next: usize },
    Split(Vec<usize>),
    Accept,
}

#[derive(Debug)]
struct Nfa {
    states: Vec<State>,
    start: usize,
}

struct NfaBuilder {
    states: Vec<State>,
}

impl NfaBuilder {
    fn push(&mut self, state: State) -> Option<usize> {
        if self.states.len() >= MAX_STATES {
            return None;
        }
        self.states.push(state);
        Some(self.states.len() - 1)
    }

    /// Compile `hir` so that it continues into `next`; returns the entry state
    fn compile(&mut self, hir: &Hir, next: usize) -> Option<usize> {
        match hir.kind() {
            HirKind::Empty | HirKind::Look(_) => Some(next),
            HirKind::Literal(literal) => {
                let text = String::from_utf8_lossy(&literal.0).into_owned();
                let mut cur = next;
                for c in text.chars().rev() {
                    cur = self.push(State::Char {
                        ranges: vec![(c as u32, c as u32)],
                        next: cur,
                    })?;
                }
                Some(cur)
            }
            HirKind::Class(class) => {
                let ranges = match class {
                    Class::Unicode(u) => u
                        .ranges()
                        .iter()
                        .map(|r| (r.start() as u32, r.end() as u32))
                        .collect(),
                    Class::Bytes(b) => b
                        .ranges()
                        .iter()
                        .map(|r| (u32::from(r.start()), u32::from(r.end())))
                        .collect(),
                };
                self.push(State::Char { ranges, next })
            }
            HirKind::Capture(capture) => self.compile(&capture.sub, next),
            HirKind::Concat(parts) => {
                let mut cur = next;
                for part in parts.iter().rev() {
                    cur = self.compile(part, cur)?;
                }
                Some(cur)
            }
            HirKind::Alternation(branches) => {
                let entries = branches
                    .iter()
                    .map(|b| self.compile(b, next))
                    .collect::<Option<Vec<_>>>()?;
                self.push(State::Split(entries))
            }
            HirKind::Repetition(rep) => {
                let mut cur = match rep.max {
                    Some(max) => {
                        // optional tail: (x(x(...)?)?)?
                        let mut cur = next;
                        for _ in rep.min..max {
                            let body = self.compile(&rep.sub, cur)?;
                            cur = self.push(State::Split(vec![body, next]))?;
                        }
                        cur
                    }
                    None => {
                        let looping = self.push(State::Split(Vec::new()))?;
                        let body = self.compile(&rep.sub, looping)?;
                        self.states[looping] = State::Split(vec![body, next]);
                        looping
                    }
                };
                for _ in 0..rep.min {
                    cur = self.compile(&rep.sub, cur)?;
                }
                Some(cur)
            }
        }
    }
}

fn build_automaton(pattern: &str) -> Option<Arc<Nfa>> {
    let hir = match regex_syntax::Parser::new().parse(&expand_pattern(pattern)) {
        Ok(hir) => hir,
        Err(e) => {
            tracing::debug!(pattern, error = %e, "pattern rejected by regex parser");
            return None;
        }
    };
    let mut builder = NfaBuilder {
        states: vec![State::Accept],
    };
    let start = builder.compile(&hir, 0)?;
    Some(Arc::new(Nfa {
        states: builder.states,
        start,
    }))
}

fn automaton(pattern: &str) -> Option<Arc<Nfa>> {
    let mut cache = AUTOMATA.lock();
    if let Some(nfa) = cache.get(pattern) {
        return nfa.clone();
    }
    let nfa = build_automaton(pattern);
    cache.put(pattern.to_string(), nfa.clone());
    nfa
}

#[derive(Debug, PartialEq)]
struct Frontier {
    cost: f64,
    pos: usize,
    state: usize,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap on cost
        other.cost.total_cmp(&self.cost)
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn substitution_cost(c: char, ranges: &[(u32, u32)]) -> f64 {
    let code = c as u32;
    let nearest = ranges
        .iter()
        .map(|&(lo, hi)| {
            if code < lo {
                lo - code
            } else if code > hi {
                code - hi
            } else {
                0
            }
        })
        .min()
        .unwrap_or(u32::MAX);
    normalize(f64::from(nearest))
}

fn edit_distance(nfa: &Nfa, subject: &[char]) -> f64 {
    let n = subject.len();
    let width = nfa.states.len();
    let mut best = vec![f64::INFINITY; (n + 1) * width];
    let mut heap = BinaryHeap::new();

    let relax = |heap: &mut BinaryHeap<Frontier>, best: &mut Vec<f64>, cost: f64, pos: usize, state: usize| {
        let slot = &mut best[pos * width + state];
        if cost < *slot {
            *slot = cost;
            heap.push(Frontier { cost, pos, state });
        }
    };

    relax(&mut heap, &mut best, 0.0, 0, nfa.start);

    while let Some(Frontier { cost, pos, state }) = heap.pop() {
        if cost > best[pos * width + state] {
            continue;
        }
        if pos == n && matches!(nfa.states[state], State::Accept) {
            return cost;
        }
        if pos < n {
            // delete subject[pos]
            relax(&mut heap, &mut best, cost + 1.0, pos + 1, state);
        }
        match &nfa.states[state] {
            State::Accept => {}
            State::Split(targets) => {
                for &t in targets {
                    relax(&mut heap, &mut best, cost, pos, t);
                }
            }
            State::Char { ranges, next } => {
                // insert a matching char
                relax(&mut heap, &mut best, cost + 1.0, pos, *next);
                if pos < n {
                    let sub = substitution_cost(subject[pos], ranges);
                    relax(&mut heap, &mut best, cost + sub, pos + 1, *next);
                }
            }
        }
    }

    f64::MAX
}

/// Distance of `subject` from fully matching `pattern`; `f64::MAX` when the pattern is unusable
pub fn regex_distance(subject: &str, pattern: &str) -> f64 {
    if full_match(pattern, subject) {
        return 0.0;
    }
    let Some(nfa) = automaton(pattern) else {
        return f64::MAX;
    };
    let chars: Vec<char> = subject.chars().collect();
    // the automaton ignores anchors, so it may find 0 where the matcher disagrees
    edit_distance(&nfa, &chars).max(f64::EPSILON)
}
