//! DSE exploration CLI
//!
//! # Usage
//!
//! ```bash
//! # Explore recorded executions, local search only
//! dse-explore explore --trace traces.json --preset fast
//!
//! # Use z3 and write the report to a file
//! dse-explore explore --trace traces.json --solver z3 --output report.json
//!
//! # Print the SMT-LIB query for negating branch 2 of the first trace
//! dse-explore query --trace traces.json --index 2
//!
//! # Validate a configuration file
//! dse-explore check-config --config nightly-dse.yaml
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use dse_engine::config::{DseConfig, Preset, ValidatedConfig};
use dse_engine::features::exploration::{Driver, ExplorationTask, SuiteExplorer};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dse-explore")]
#[command(about = "Derive new test inputs by negating recorded branch conditions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Explore recorded executions and generate new inputs
    Explore {
        /// JSON trace: one {input, path_condition} object or an array of them
        #[arg(short, long)]
        trace: PathBuf,

        /// YAML v1 configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Preset when no configuration file is given (fast, balanced, thorough)
        #[arg(short, long, default_value = "balanced")]
        preset: String,

        /// SMT solver executable (overrides the configuration)
        #[arg(short, long)]
        solver: Option<PathBuf>,

        /// Report destination (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the SMT-LIB query for negating one branch
    Query {
        /// JSON trace
        #[arg(short, long)]
        trace: PathBuf,

        /// Branch index within the path condition
        #[arg(short, long)]
        index: usize,

        /// Trace entry when the file holds several executions
        #[arg(long, default_value = "0")]
        task: usize,

        /// Emit domain bound assertions for narrow integer variables
        #[arg(long)]
        bounds: bool,
    },

    /// Validate a configuration file and print its summary
    CheckConfig {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TraceDocument {
    Many(Vec<ExplorationTask>),
    One(ExplorationTask),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Explore {
            trace,
            config,
            preset,
            solver,
            output,
        } => {
            run_explore(&trace, config.as_deref(), &preset, solver, output.as_deref()).await?;
        }
        Commands::Query {
            trace,
            index,
            task,
            bounds,
        } => {
            print_query(&trace, index, task, bounds)?;
        }
        Commands::CheckConfig { config } => {
            check_config(&config)?;
        }
    }

    Ok(())
}

fn load_tasks(path: &Path) -> Result<Vec<ExplorationTask>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read trace {}: {}", path.display(), e))?;
    let document: TraceDocument = serde_json::from_str(&content)
        .map_err(|e| format!("invalid trace {}: {}", path.display(), e))?;
    Ok(match document {
        TraceDocument::Many(tasks) => tasks,
        TraceDocument::One(task) => vec![task],
    })
}

fn load_config(
    config: Option<&Path>,
    preset: &str,
    solver: Option<PathBuf>,
) -> Result<ValidatedConfig, Box<dyn std::error::Error>> {
    let base = match config {
        Some(path) => DseConfig::from_yaml(&path.to_string_lossy())?.into_inner(),
        None => DseConfig::preset(preset.parse::<Preset>()?),
    };
    let base = match solver {
        Some(path) => base.solver(|c| c.executable(path)),
        None => base,
    };
    Ok(base.build()?)
}

async fn run_explore(
    trace: &Path,
    config: Option<&Path>,
    preset: &str,
    solver: Option<PathBuf>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tasks = load_tasks(trace)?;
    let config = load_config(config, preset, solver)?;
    tracing::debug!(summary = %config.summary(), "configuration");

    let explorer = SuiteExplorer::new(config)?;
    let suite = explorer.explore_all(tasks).await;

    eprintln!(
        "Generated {} input(s) from {} execution(s): {}",
        suite.generated_count(),
        suite.reports.len(),
        suite.stats
    );

    let json = serde_json::to_string_pretty(&suite)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            eprintln!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn print_query(
    trace: &Path,
    index: usize,
    task: usize,
    bounds: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let tasks = load_tasks(trace)?;
    let selected = tasks
        .get(task)
        .ok_or_else(|| format!("trace has {} execution(s), no entry {}", tasks.len(), task))?;

    let config = DseConfig::preset(Preset::default())
        .solver(|c| c.no_executable().add_variable_bounds(bounds))
        .build()?;
    let driver = Driver::new(config)?;
    print!("{}", driver.query_text(&selected.path_condition, index)?);
    Ok(())
}

fn check_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = DseConfig::from_yaml(&path.to_string_lossy())?;
    println!("✅ {} is valid", path.display());
    println!("{}", config.summary());
    Ok(())
}
