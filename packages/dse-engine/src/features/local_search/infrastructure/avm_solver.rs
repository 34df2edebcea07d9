//! Alternating Variable Method solver
//!
//! Rounds over every free variable, improving one at a time, until fitness
//! reaches 0 or a whole round brings no improvement. Local optima trigger a
//! bounded number of random restarts. The whole search is bounded by an
//! evaluation count and a wall-clock deadline.

use super::fitness::{Evaluator, Fitness};
use super::integer_avm::search_integer;
use super::real_avm::search_real;
use super::string_avm::search_string;
use crate::config::LocalSearchConfig;
use crate::errors::DseError;
use crate::features::solver::ports::{ConstraintSolver, SolverResult, UnknownReason};
use crate::features::symbolic::domain::{Constraint, Domain, Model, Value, Variable};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Spread of random restarts around the recorded value
const RESTART_RADIUS: i64 = 1 << 16;

#[derive(Debug, Clone, Default)]
pub struct AvmSolver {
    config: LocalSearchConfig,
}

impl AvmSolver {
    pub fn new(config: LocalSearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocalSearchConfig {
        &self.config
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Search a value for one variable, all others fixed at their recorded values
    ///
    /// `None` when `budget` evaluations pass without satisfying every constraint.
    pub fn search(&self, variable: &Variable, constraints: &[Constraint], budget: u64) -> Option<Value> {
        let mut model = Model::from_variables(&free_variables(constraints));
        if !model.contains(&variable.name) {
            model.insert(variable.name.clone(), variable.concrete.clone());
        }
        let mut eval = Evaluator::new(constraints, budget, None);
        let mut rng = self.rng();

        let mut best = eval.evaluate(&model).ok()?;
        while !best.is_zero() {
            let before = best;
            best = search_variable(variable, &mut model, &mut eval, best, &mut rng).ok()?;
            if best >= before {
                break;
            }
        }

        if best.is_zero() && model.satisfies(constraints) {
            model.get(&variable.name).cloned()
        } else {
            None
        }
    }

    /// Synchronous solve; `timeout` applies when no local-search time limit is configured
    #[tracing::instrument(skip_all, fields(constraints = constraints.len()))]
    pub fn solve_blocking(&self, constraints: &[Constraint], timeout: Duration) -> SolverResult {
        let variables = free_variables(constraints);
        let mut model = Model::from_variables(&variables);
        if model.satisfies(constraints) {
            return SolverResult::Sat(model);
        }
        if variables.is_empty() {
            return SolverResult::Unsat;
        }

        let limit = self.config.time_limit().unwrap_or(timeout);
        let mut eval = Evaluator::new(constraints, self.config.max_evaluations, Some(Instant::now() + limit));
        let mut rng = self.rng();

        match self.run(&variables, constraints, &mut model, &mut eval, &mut rng) {
            Ok(true) => {
                tracing::debug!(evaluations = eval.evaluations(), "local search converged");
                SolverResult::Sat(model)
            }
            Ok(false) => {
                tracing::debug!(evaluations = eval.evaluations(), "local search stuck in local optima");
                SolverResult::Unknown(UnknownReason::LocalSearchExhausted)
            }
            Err(DseError::LocalSearchExhausted { evaluations }) => {
                tracing::debug!(evaluations, "local search budget exhausted");
                SolverResult::Unknown(UnknownReason::LocalSearchExhausted)
            }
            Err(e) => SolverResult::Error(e.to_string()),
        }
    }

    fn run(
        &self,
        variables: &[Variable],
        constraints: &[Constraint],
        model: &mut Model,
        eval: &mut Evaluator<'_>,
        rng: &mut StdRng,
    ) -> Result<bool, DseError> {
        let mut best = eval.evaluate(model)?;

        for restart in 0..=self.config.max_restarts {
            if restart > 0 {
                randomize(variables, model, rng);
                best = eval.evaluate(model)?;
                tracing::trace!(restart, fitness = %best, "local search restart");
            }

            loop {
                let round_start = best;
                for variable in variables {
                    best = search_variable(variable, model, eval, best, rng)?;
                    if best.is_zero() {
                        break;
                    }
                }
                if best.is_zero() {
                    if model.satisfies(constraints) {
                        return Ok(true);
                    }
                    break;
                }
                if best >= round_start {
                    break;
                }
            }
        }

        Ok(false)
    }
}

#[async_trait]
impl ConstraintSolver for AvmSolver {
    fn name(&self) -> &'static str {
        "avm"
    }

    async fn solve(&self, constraints: &[Constraint], timeout: Duration) -> SolverResult {
        let solver = self.clone();
        let constraints = constraints.to_vec();
        match tokio::task::spawn_blocking(move || solver.solve_blocking(&constraints, timeout)).await {
            Ok(result) => result,
            Err(e) => SolverResult::Error(format!("local search task failed: {}", e)),
        }
    }
}

fn free_variables(constraints: &[Constraint]) -> Vec<Variable> {
    constraints
        .iter()
        .flat_map(Constraint::variables)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn search_variable(
    variable: &Variable,
    model: &mut Model,
    eval: &mut Evaluator<'_>,
    fitness: Fitness,
    rng: &mut StdRng,
) -> Result<Fitness, DseError> {
    match variable.domain {
        Domain::Integer { .. } => search_integer(variable, model, eval, fitness),
        Domain::Real { .. } => search_real(variable, model, eval, fitness),
        Domain::String => search_string(variable, model, eval, fitness, rng),
    }
}

fn randomize(variables: &[Variable], model: &mut Model, rng: &mut StdRng) {
    for variable in variables {
        let value = match variable.domain {
            Domain::Integer { min, max } => match variable.narrow_int_bounds() {
                Some(_) if max.abs_diff(min) <= RESTART_RADIUS as u64 * 2 => {
                    Value::Int(rng.gen_range(min..=max))
                }
                _ => {
                    let offset = rng.gen_range(-RESTART_RADIUS..=RESTART_RADIUS);
                    Value::Int(variable.clamp_int(variable.concrete.to_int().saturating_add(offset)))
                }
            },
            Domain::Real { .. } => {
                let base = variable.concrete.to_real();
                let base = if base.is_finite() { base } else { 0.0 };
                let offset = rng.gen_range(-(RESTART_RADIUS as f64)..=RESTART_RADIUS as f64);
                Value::Real(variable.clamp_real(base + offset))
            }
            Domain::String => {
                let len = rng.gen_range(0..=variable.concrete.to_text().chars().count().max(8));
                Value::Str(
                    (0..len)
                        .map(|_| char::from(rng.gen_range(0x20u8..=0x7e)))
                        .collect(),
                )
            }
        };
        model.insert(variable.name.clone(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::symbolic::domain::Expression;

    fn seeded() -> AvmSolver {
        AvmSolver::new(LocalSearchConfig::default().seed(42))
    }

    #[test]
    fn test_search_single_variable() {
        let v = Variable::int("v", 0);
        let constraints = vec![Constraint::eq(Expression::var(v.clone()), Expression::int(235_082))];
        assert_eq!(seeded().search(&v, &constraints, 10_000), Some(Value::Int(235_082)));
    }

    #[test]
    fn test_search_large_int_target() {
        let v = Variable::int("v", 0);
        let target = i64::from(i32::MAX) - 7;
        let constraints = vec![Constraint::eq(Expression::var(v.clone()), Expression::int(target))];
        assert_eq!(seeded().search(&v, &constraints, 10_000), Some(Value::Int(target)));

        let result = seeded().solve_blocking(&constraints, Duration::from_secs(5));
        assert_eq!(result.model().and_then(|m| m.get("v")), Some(&Value::Int(target)));
    }

    #[test]
    fn test_search_exhaustion_returns_none() {
        let v = Variable::int("v", 0);
        let constraints = vec![Constraint::eq(Expression::var(v.clone()), Expression::int(1_000_000_000))];
        assert_eq!(seeded().search(&v, &constraints, 5), None);
    }

    #[test]
    fn test_already_satisfied() {
        let x = Variable::int("x", 3);
        let constraints = vec![Constraint::gt(Expression::var(x), Expression::int(0))];
        let result = seeded().solve_blocking(&constraints, Duration::from_secs(1));
        assert_eq!(result.model().and_then(|m| m.get("x")), Some(&Value::Int(3)));
    }

    #[test]
    fn test_non_linear_product() {
        let x = Expression::var(Variable::int("x", 1));
        let y = Expression::var(Variable::int("y", 1));
        let constraints = vec![Constraint::eq(x.mul(y), Expression::int(391))];
        let result = seeded().solve_blocking(&constraints, Duration::from_secs(5));
        let model = result.model().expect("sat");
        assert!(model.satisfies(&constraints));
    }

    #[test]
    fn test_constant_contradiction_is_unsat() {
        let constraints = vec![Constraint::eq(Expression::int(1), Expression::int(2))];
        assert_eq!(
            seeded().solve_blocking(&constraints, Duration::from_secs(1)),
            SolverResult::Unsat
        );
    }
}
