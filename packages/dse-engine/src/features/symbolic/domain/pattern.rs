//! Pattern rewriting and full-match evaluation for `matches` predicates
//!
//! Recorded patterns use a dialect close to the `regex` crate's. Two
//! rewrites exist:
//! - [`matcher_pattern`] only drops constructs `regex` rejects (possessive
//!   quantifiers, the `(?d)` flag) and is what [`full_match`] compiles;
//! - [`expand_pattern`] additionally turns `\d`, `\s`, `\w` and their negations
//!   into ASCII brackets and drops outer anchors, for the distance automaton.
//!
//! Both scan escape-aware, so `\\d` stays an escaped backslash followed by `d`.

use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::num::NonZeroUsize;

const CACHE_CAPACITY: usize = 512;

/// Compiled full-match regexes; `None` marks patterns that failed to compile
static FULL_MATCH_CACHE: Lazy<Mutex<LruCache<String, Option<Regex>>>> =
    Lazy::new(|| Mutex::new(bounded_cache()));

pub(crate) fn bounded_cache<V>() -> LruCache<String, V> {
    NonZeroUsize::new(CACHE_CAPACITY).map_or_else(LruCache::unbounded, LruCache::new)
}

fn ascii_class(c: char) -> Option<&'static str> {
    Some(match c {
        'd' => "[0-9]",
        'D' => "[^0-9]",
        's' => "[ \\t\\n\\f\\r]",
        'S' => "[^ \\t\\n\\f\\r]",
        'w' => "[a-zA-Z_0-9]",
        'W' => "[^a-zA-Z_0-9]",
        _ => return None,
    })
}

fn rewrite(pattern: &str, expand_classes: bool) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut class_depth = 0usize;
    let mut after_quantifier = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                match chars.get(i + 1) {
                    Some(&e) => {
                        match ascii_class(e).filter(|_| expand_classes) {
                            Some(class) => out.push_str(class),
                            None => {
                                out.push('\\');
                                out.push(e);
                            }
                        }
                        i += 2;
                    }
                    None => {
                        out.push('\\');
                        i += 1;
                    }
                }
                after_quantifier = false;
                continue;
            }
            '[' => class_depth += 1,
            ']' if class_depth > 0 => class_depth -= 1,
            '(' if class_depth == 0 && chars[i..].starts_with(&['(', '?', 'd', ')']) => {
                i += 4;
                continue;
            }
            '+' if class_depth == 0 && after_quantifier => {
                // possessive suffix
                after_quantifier = false;
                i += 1;
                continue;
            }
            _ => {}
        }
        out.push(c);
        after_quantifier = class_depth == 0 && matches!(c, '*' | '+' | '?' | '}');
        i += 1;
    }
    out
}

/// `pattern` in the dialect the `regex` crate compiles
pub fn matcher_pattern(pattern: &str) -> String {
    rewrite(pattern, false)
}

/// `pattern` with ASCII class brackets and no outer anchors
///
/// Matching is always whole-string, so a leading `^` and an unescaped
/// trailing `$` carry no information.
pub fn expand_pattern(pattern: &str) -> String {
    let mut p = rewrite(pattern, true);
    if p.starts_with('^') {
        p.remove(0);
    }
    if p.ends_with('$') {
        let backslashes = p[..p.len() - 1].chars().rev().take_while(|&c| c == '\\').count();
        if backslashes % 2 == 0 {
            p.pop();
        }
    }
    p
}

/// Whole-string match; invalid patterns never match
pub fn full_match(pattern: &str, subject: &str) -> bool {
    let mut cache = FULL_MATCH_CACHE.lock();
    if let Some(compiled) = cache.get(pattern) {
        return compiled.as_ref().is_some_and(|re| re.is_match(subject));
    }
    let anchored = format!("^(?:{})$", matcher_pattern(pattern));
    let compiled = match Regex::new(&anchored) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::debug!(pattern, error = %e, "pattern does not compile");
            None
        }
    };
    let matched = compiled.as_ref().is_some_and(|re| re.is_match(subject));
    cache.put(pattern.to_string(), compiled);
    matched
}
