//! Integer AVM: exploratory ±1 probes followed by accelerating pattern moves

use super::fitness::{Evaluator, Fitness};
use crate::errors::DseError;
use crate::features::symbolic::domain::{Model, Value, Variable};

/// Improve `variable` in `model` until no ±1 probe helps; returns the new fitness
pub fn search_integer(
    variable: &Variable,
    model: &mut Model,
    eval: &mut Evaluator<'_>,
    fitness: Fitness,
) -> Result<Fitness, DseError> {
    let mut value = model
        .get(&variable.name)
        .map_or_else(|| variable.concrete.to_int(), Value::to_int);
    let mut best = fitness;

    while !best.is_zero() {
        let Some((direction, candidate, f)) = explore(variable, model, eval, value, best)? else {
            break;
        };
        value = candidate;
        best = f;
        (value, best) = pattern_moves(variable, model, eval, value, best, direction)?;
    }

    model.insert(variable.name.clone(), Value::Int(value));
    Ok(best)
}

fn try_value(
    variable: &Variable,
    model: &mut Model,
    eval: &mut Evaluator<'_>,
    candidate: i64,
) -> Result<Fitness, DseError> {
    model.insert(variable.name.clone(), Value::Int(candidate));
    eval.evaluate(model)
}

fn explore(
    variable: &Variable,
    model: &mut Model,
    eval: &mut Evaluator<'_>,
    value: i64,
    best: Fitness,
) -> Result<Option<(i64, i64, Fitness)>, DseError> {
    for direction in [1i64, -1] {
        let candidate = variable.clamp_int(value.saturating_add(direction));
        if candidate == value {
            continue;
        }
        let f = try_value(variable, model, eval, candidate)?;
        if f < best {
            return Ok(Some((direction, candidate, f)));
        }
    }
    model.insert(variable.name.clone(), Value::Int(value));
    Ok(None)
}

/// Double the step while it improves, halve it on failure until it vanishes
fn pattern_moves(
    variable: &Variable,
    model: &mut Model,
    eval: &mut Evaluator<'_>,
    mut value: i64,
    mut best: Fitness,
    direction: i64,
) -> Result<(i64, Fitness), DseError> {
    let mut step = direction.saturating_mul(2);
    while step != 0 && !best.is_zero() {
        let candidate = variable.clamp_int(value.saturating_add(step));
        if candidate != value {
            let f = try_value(variable, model, eval, candidate)?;
            if f < best {
                value = candidate;
                best = f;
                step = step.saturating_mul(2);
                continue;
            }
        }
        step /= 2;
    }
    model.insert(variable.name.clone(), Value::Int(value));
    Ok((value, best))
}
