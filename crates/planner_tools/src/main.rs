//! Build-Order Planner - Command-line Tools

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use planner_tools::plan::{plan_scenario, DEFAULT_MAX_MOVES};
use planner_tools::{Result, Scenario};

#[derive(Parser)]
#[command(name = "planner-tools")]
#[command(about = "Build-order planning and tech-tree validation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a build order for a scenario
    Plan {
        /// Path to the scenario RON file
        scenario: PathBuf,
        /// Maximum number of moves to issue
        #[arg(long, default_value_t = DEFAULT_MAX_MOVES)]
        cycles: usize,
        /// Override the scenario's RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Override the scenario's iterations per cycle
        #[arg(long)]
        iterations: Option<u32>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate tech-tree data files
    Validate {
        /// Tech-tree file or directory of them
        #[arg(default_value = "scenarios")]
        path: PathBuf,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Plan {
            scenario,
            cycles,
            seed,
            iterations,
            json,
        } => run_plan(&scenario, cycles, seed, iterations, json),
        Commands::Validate { path } => run_validate(&path),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run_plan(
    path: &Path,
    cycles: usize,
    seed: Option<u64>,
    iterations: Option<u32>,
    json: bool,
) -> Result<()> {
    let mut scenario = Scenario::load(path)?;
    if let Some(seed) = seed {
        scenario.config = scenario.config.with_seed(seed);
    }
    if let Some(iterations) = iterations {
        scenario.config = scenario.config.with_iterations(iterations);
    }
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let report = plan_scenario(&scenario, base_dir, cycles)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    if !report.goal_met {
        tracing::warn!(moves = report.orders.len(), "Goal not reached within the move limit");
    }
    Ok(())
}

fn run_validate(path: &Path) -> Result<()> {
    tracing::info!("Validating tech-tree data in: {}", path.display());
    let summaries = planner_tools::validate::validate_path(path)?;
    for summary in &summaries {
        tracing::info!(
            file = %summary.path.display(),
            units = summary.units,
            techs = summary.techs,
            upgrades = summary.upgrades,
            races = ?summary.races,
            "Tech tree valid"
        );
    }
    tracing::info!("Validation passed ({} files)", summaries.len());
    Ok(())
}
