//! String AVM
//!
//! Three moves per round, repeated while the round improves:
//! 1. drop characters from the end
//! 2. per-character AVM over code points (surrogates skipped), then ±32 probes
//! 3. append random printable characters

use super::fitness::{Evaluator, Fitness};
use crate::errors::DseError;
use crate::features::symbolic::domain::{Model, Value, Variable};
use rand::rngs::StdRng;
use rand::Rng;

const MAX_CODE: i64 = 0xFFFF;
const SURROGATES: std::ops::RangeInclusive<i64> = 0xD800..=0xDFFF;
/// Consecutive rejected appends before giving up on growth
const APPEND_ATTEMPTS: usize = 8;

struct StringSearch<'v, 'm, 'e, 'c> {
    variable: &'v Variable,
    model: &'m mut Model,
    eval: &'e mut Evaluator<'c>,
    chars: Vec<char>,
    best: Fitness,
}

/// Improve a string `variable` in `model`; returns the new fitness
pub fn search_string(
    variable: &Variable,
    model: &mut Model,
    eval: &mut Evaluator<'_>,
    fitness: Fitness,
    rng: &mut StdRng,
) -> Result<Fitness, DseError> {
    let chars = model
        .get(&variable.name)
        .map_or_else(|| variable.concrete.to_text(), Value::to_text)
        .chars()
        .collect();
    let mut search = StringSearch {
        variable,
        model,
        eval,
        chars,
        best: fitness,
    };

    while !search.best.is_zero() {
        let before = search.best;
        search.delete_from_end()?;
        search.tune_characters()?;
        search.append_random(rng)?;
        if search.best >= before {
            break;
        }
    }

    search.commit();
    Ok(search.best)
}

impl StringSearch<'_, '_, '_, '_> {
    fn commit(&mut self) {
        let text: String = self.chars.iter().collect();
        self.model.insert(self.variable.name.clone(), Value::Str(text));
    }

    fn try_current(&mut self) -> Result<Fitness, DseError> {
        self.commit();
        self.eval.evaluate(self.model)
    }

    fn delete_from_end(&mut self) -> Result<(), DseError> {
        while !self.best.is_zero() {
            let Some(last) = self.chars.pop() else {
                break;
            };
            let f = self.try_current()?;
            if f < self.best {
                self.best = f;
            } else {
                self.chars.push(last);
                break;
            }
        }
        self.commit();
        Ok(())
    }

    fn tune_characters(&mut self) -> Result<(), DseError> {
        for index in 0..self.chars.len() {
            if self.best.is_zero() {
                break;
            }
            self.tune_character(index)?;
        }
        Ok(())
    }

    /// Set `chars[index]` to `code`; `None` when `code` is no BMP scalar
    fn try_code(&mut self, index: usize, code: i64) -> Result<Option<Fitness>, DseError> {
        let Some(c) = u32::try_from(code).ok().and_then(char::from_u32) else {
            return Ok(None);
        };
        self.chars[index] = c;
        self.try_current().map(Some)
    }

    fn tune_character(&mut self, index: usize) -> Result<(), DseError> {
        let mut code = i64::from(u32::from(self.chars[index]));

        while !self.best.is_zero() {
            let mut moved = None;
            for direction in [1i64, -1, 32, -32] {
                let Some(candidate) = step_code(code, direction) else {
                    continue;
                };
                if let Some(f) = self.try_code(index, candidate)? {
                    if f < self.best {
                        self.best = f;
                        code = candidate;
                        moved = Some(direction);
                        break;
                    }
                }
            }
            let Some(direction) = moved else {
                break;
            };
            if direction.abs() == 1 {
                code = self.accelerate(index, code, direction)?;
            }
        }

        // restore the incumbent after rejected probes
        if let Some(c) = u32::try_from(code).ok().and_then(char::from_u32) {
            self.chars[index] = c;
        }
        self.commit();
        Ok(())
    }

    fn accelerate(&mut self, index: usize, mut code: i64, direction: i64) -> Result<i64, DseError> {
        let mut step = direction * 2;
        while step != 0 && !self.best.is_zero() {
            if let Some(candidate) = step_code(code, step) {
                if let Some(f) = self.try_code(index, candidate)? {
                    if f < self.best {
                        self.best = f;
                        code = candidate;
                        step *= 2;
                        continue;
                    }
                }
            }
            step /= 2;
        }
        Ok(code)
    }

    fn append_random(&mut self, rng: &mut StdRng) -> Result<(), DseError> {
        let mut rejected = 0;
        while rejected < APPEND_ATTEMPTS && !self.best.is_zero() {
            self.chars.push(char::from(rng.gen_range(0x20u8..=0x7e)));
            let f = self.try_current()?;
            if f < self.best {
                self.best = f;
                rejected = 0;
                let last = self.chars.len() - 1;
                self.tune_character(last)?;
            } else {
                self.chars.pop();
                rejected += 1;
            }
        }
        self.commit();
        Ok(())
    }
}

/// `code + step` within the BMP, hopping over the surrogate block
fn step_code(code: i64, step: i64) -> Option<i64> {
    let mut next = code.checked_add(step)?;
    if SURROGATES.contains(&next) {
        next = if step > 0 {
            SURROGATES.end() + 1
        } else {
            SURROGATES.start() - 1
        };
    }
    (0..=MAX_CODE).contains(&next).then_some(next)
}
