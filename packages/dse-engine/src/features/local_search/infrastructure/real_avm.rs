//! Real AVM: integral steps first, then decimal precision passes

use super::fitness::{Evaluator, Fitness};
use crate::errors::DseError;
use crate::features::symbolic::domain::{Model, Value, Variable};

/// Finest decimal precision tried, as a power of ten
const MAX_PRECISION: i32 = 15;

/// Improve a real `variable` in `model`; returns the new fitness
pub fn search_real(
    variable: &Variable,
    model: &mut Model,
    eval: &mut Evaluator<'_>,
    fitness: Fitness,
) -> Result<Fitness, DseError> {
    let mut value = model
        .get(&variable.name)
        .map_or_else(|| variable.concrete.to_real(), Value::to_real);
    let mut best = fitness;
    if !value.is_finite() {
        value = variable.clamp_real(0.0);
        best = try_value(variable, model, eval, value)?;
    }

    for precision in 0..=MAX_PRECISION {
        let delta = 10f64.powi(-precision);
        while !best.is_zero() {
            let Some((direction, candidate, f)) = explore(variable, model, eval, value, best, delta)?
            else {
                break;
            };
            value = candidate;
            best = f;
            (value, best) = pattern_moves(variable, model, eval, value, best, direction * delta, delta)?;
        }
        if best.is_zero() {
            break;
        }
    }

    model.insert(variable.name.clone(), Value::Real(value));
    Ok(best)
}

fn try_value(
    variable: &Variable,
    model: &mut Model,
    eval: &mut Evaluator<'_>,
    candidate: f64,
) -> Result<Fitness, DseError> {
    model.insert(variable.name.clone(), Value::Real(candidate));
    eval.evaluate(model)
}

fn candidate(variable: &Variable, value: f64, step: f64) -> Option<f64> {
    let c = variable.clamp_real(value + step);
    (c.is_finite() && c != value).then_some(c)
}

fn explore(
    variable: &Variable,
    model: &mut Model,
    eval: &mut Evaluator<'_>,
    value: f64,
    best: Fitness,
    delta: f64,
) -> Result<Option<(f64, f64, Fitness)>, DseError> {
    for direction in [1.0, -1.0] {
        let Some(c) = candidate(variable, value, direction * delta) else {
            continue;
        };
        let f = try_value(variable, model, eval, c)?;
        if f < best {
            return Ok(Some((direction, c, f)));
        }
    }
    model.insert(variable.name.clone(), Value::Real(value));
    Ok(None)
}

fn pattern_moves(
    variable: &Variable,
    model: &mut Model,
    eval: &mut Evaluator<'_>,
    mut value: f64,
    mut best: Fitness,
    first_step: f64,
    delta: f64,
) -> Result<(f64, Fitness), DseError> {
    let mut step = first_step * 2.0;
    while step.abs() >= delta && !best.is_zero() {
        if let Some(c) = candidate(variable, value, step) {
            let f = try_value(variable, model, eval, c)?;
            if f < best {
                value = c;
                best = f;
                step *= 2.0;
                continue;
            }
        }
        step /= 2.0;
    }
    model.insert(variable.name.clone(), Value::Real(value));
    Ok((value, best))
}
