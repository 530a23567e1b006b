//! Benchmarking CLI for Lagrangian set-covering bounds.

mod generate;
mod method_choice;
mod orlib;
mod report;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use scp_core::{DualBoundSolver, ScpInstance, SubgradientSettings};
use tracing_subscriber::EnvFilter;

use method_choice::{run_with_choice, MethodChoice};
use report::RunReport;

#[derive(Parser)]
#[command(name = "scp-bench")]
#[command(about = "Lagrangian dual bounds for set-covering instances")]
struct Cli {
    /// Log every `--log-freq` iterations
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(long, global = true, default_value_t = 10)]
    log_freq: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bound an OR-Library SCP instance
    Solve {
        file: PathBuf,

        /// Upper bound for the basic method (implies --method basic)
        #[arg(short = 'b', long)]
        upper_bound: Option<f64>,

        #[arg(long, value_enum)]
        method: Option<MethodChoice>,

        #[arg(long, default_value_t = 300)]
        max_iter: usize,

        /// Write the run report as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Print the best dual vector and its reduced costs
        #[arg(long)]
        show_duals: bool,

        /// Compare the bound against a report saved with --json
        #[arg(long)]
        baseline: Option<PathBuf>,
    },
    /// Bound a seeded random instance with both methods
    Random {
        #[arg(long, default_value_t = 200)]
        rows: usize,

        #[arg(long, default_value_t = 1000)]
        cols: usize,

        #[arg(long, default_value_t = 0.02)]
        density: f64,

        #[arg(long, default_value_t = 100)]
        max_cost: u32,

        #[arg(long, default_value_t = 12345)]
        seed: u64,

        #[arg(long, default_value_t = 300)]
        max_iter: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let settings = SubgradientSettings {
        verbose: cli.verbose || SubgradientSettings::default().verbose,
        log_freq: cli.log_freq,
        ..Default::default()
    };

    match cli.command {
        Commands::Solve {
            file,
            upper_bound,
            method,
            max_iter,
            json,
            show_duals,
            baseline,
        } => {
            let choice = match (method, upper_bound) {
                (Some(MethodChoice::Basic), None) => {
                    bail!("--method basic needs an upper bound (-b)")
                }
                (Some(choice), _) => choice,
                (None, Some(_)) => MethodChoice::Basic,
                (None, None) => MethodChoice::Sps,
            };

            let problem = orlib::parse_orlib(&file)?;
            log::info!(
                "Loaded {}: {} rows, {} cols, {} nonzeros",
                problem.name,
                problem.num_rows,
                problem.num_cols,
                problem.num_entries()
            );
            let instance = problem.to_instance()?;
            let report = solve_one(
                problem.name.clone(),
                instance,
                settings,
                choice,
                max_iter,
                upper_bound,
                show_duals,
            )?;
            report.print();

            if let Some(path) = baseline {
                let saved = RunReport::load_json(&path)?;
                report.compare(&saved).print(&saved);
            }

            if let Some(path) = json {
                report.save_json(&path)?;
                log::info!("Report written to {}", path.display());
            }
        }
        Commands::Random {
            rows,
            cols,
            density,
            max_cost,
            seed,
            max_iter,
        } => {
            let instance = generate::random_instance(rows, cols, density, max_cost, seed)?;
            let (cover, cover_cost) = generate::greedy_cover(&instance);
            log::info!(
                "Greedy cover uses {} columns, cost {}",
                cover.len(),
                cover_cost
            );

            let name = format!("random-{}x{}-d{}-s{}", rows, cols, density, seed);
            for choice in [MethodChoice::Sps, MethodChoice::Basic] {
                let report = solve_one(
                    name.clone(),
                    instance.clone(),
                    settings.clone(),
                    choice,
                    max_iter,
                    Some(cover_cost as f64),
                    false,
                )?;
                report.print();
            }
        }
    }

    Ok(())
}

fn solve_one(
    name: String,
    instance: ScpInstance,
    settings: SubgradientSettings,
    choice: MethodChoice,
    max_iter: usize,
    upper_bound: Option<f64>,
    show_duals: bool,
) -> Result<RunReport> {
    let dims = (
        instance.num_rows(),
        instance.num_cols(),
        instance.num_nonzeros(),
    );
    let mut solver = DualBoundSolver::with_settings(instance, settings);

    log::info!("Running {} for at most {} iterations", choice.name(), max_iter);
    let start = Instant::now();
    let result = run_with_choice(&mut solver, choice, max_iter, upper_bound)?;
    let elapsed = start.elapsed();

    let mut report = RunReport::new(
        name,
        dims,
        choice.name(),
        &result,
        upper_bound,
        elapsed,
        show_duals,
    );
    if show_duals {
        report.reduced_costs = Some(solver.reduced_costs()?);
    }
    Ok(report)
}
