//! External SMT solver adapter
//!
//! Renders constraints as an SMT-LIB 2 query, pipes it to a solver process
//! (`z3 -smt2 -in`, `cvc5 --lang smt2`, ...) and interprets the answer:
//!
//! | first token  | result                                  |
//! |--------------|-----------------------------------------|
//! | `sat`        | model parsed from the remaining output  |
//! | `unsat`      | `Unsat`                                 |
//! | `unknown`    | `Unknown(Incomplete)`                   |
//! | `(error ..)` | `Error(message)`                        |
//! | other        | `ParseError`                            |

use super::model_parser::{parse_error_message, parse_model};
use super::process::{find_on_path, run_with_input, ProcessOutcome};
use super::smtlib_printer::render_query;
use crate::config::SolverConfig;
use crate::errors::DseError;
use crate::features::solver::ports::{ConstraintSolver, SolverResult, UnknownReason};
use crate::features::symbolic::domain::Constraint;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// SMT-LIB 2 solver driven through a child process
#[derive(Debug, Clone)]
pub struct SmtSolver {
    executable: PathBuf,
    args: Vec<String>,
    add_variable_bounds: bool,
}

impl SmtSolver {
    /// Resolve the configured executable. Fails when it is unset or unreachable.
    pub fn new(config: &SolverConfig) -> Result<Self, DseError> {
        let configured = config
            .executable
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| DseError::misconfiguration("no SMT solver executable configured"))?;

        let executable = if configured.components().count() > 1 {
            if !configured.is_file() {
                return Err(DseError::misconfiguration(format!(
                    "SMT solver executable not found: {}",
                    configured.display()
                )));
            }
            configured.clone()
        } else {
            let name = configured.to_string_lossy();
            find_on_path(&name).ok_or_else(|| {
                DseError::misconfiguration(format!("SMT solver '{}' not found on PATH", name))
            })?
        };

        tracing::debug!(executable = %executable.display(), "SMT solver resolved");

        Ok(Self {
            executable,
            args: config.args.clone(),
            add_variable_bounds: config.add_variable_bounds,
        })
    }

    pub fn executable(&self) -> &std::path::Path {
        &self.executable
    }

    /// Interpret raw solver stdout
    pub fn interpret(stdout: &str) -> SolverResult {
        let trimmed = stdout.trim_start();
        let first = trimmed
            .split(|c: char| c.is_whitespace())
            .next()
            .unwrap_or_default();

        match first {
            "sat" => match parse_model(&trimmed[3..]) {
                Ok(model) => SolverResult::Sat(model),
                Err(e) => SolverResult::ParseError {
                    raw: stdout.to_string(),
                    message: e.to_string(),
                },
            },
            "unsat" => SolverResult::Unsat,
            "unknown" => SolverResult::Unknown(UnknownReason::Incomplete),
            _ if trimmed.starts_with("(error") => SolverResult::Error(
                parse_error_message(trimmed).unwrap_or_else(|| trimmed.trim_end().to_string()),
            ),
            _ => SolverResult::ParseError {
                raw: stdout.to_string(),
                message: if trimmed.is_empty() {
                    "solver produced no output".to_string()
                } else {
                    format!("unexpected solver answer '{}'", first)
                },
            },
        }
    }
}

#[async_trait]
impl ConstraintSolver for SmtSolver {
    fn name(&self) -> &'static str {
        "smt"
    }

    #[tracing::instrument(skip_all, fields(constraints = constraints.len()))]
    async fn solve(&self, constraints: &[Constraint], timeout: Duration) -> SolverResult {
        let query = match render_query(constraints, self.add_variable_bounds) {
            Ok(query) => query,
            Err(e) => return SolverResult::Error(e.to_string()),
        };
        tracing::trace!(query = %query, "SMT query");

        let started = Instant::now();
        let outcome = run_with_input(&self.executable, &self.args, &query, timeout).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            ProcessOutcome::Completed {
                status,
                stdout,
                stderr,
            } => {
                let result = Self::interpret(&stdout);
                if !status.success() && !stderr.is_empty() {
                    tracing::debug!(status = %status, stderr = %stderr.trim_end(), "solver exited abnormally");
                }
                tracing::debug!(elapsed_ms, result = %result, "SMT solver finished");
                result
            }
            ProcessOutcome::TimedOut => {
                tracing::debug!(elapsed_ms, "SMT solver timed out");
                SolverResult::Unknown(UnknownReason::Timeout)
            }
            ProcessOutcome::Failed(e) => {
                tracing::warn!(error = %e, "SMT solver process failed");
                SolverResult::Error(format!("solver process failed: {}", e))
            }
        }
    }
}
