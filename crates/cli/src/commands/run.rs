use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use islevo_sim::genome::RealVector;
use islevo_sim::simulation::EvolutionResult;
use serde::Serialize;
use std::fs;
use std::time::{Duration, Instant};
use tracing::info;

use super::load_config;
use crate::args::{RunArgs, SummaryFormat};
use crate::printing::{print_parameters, print_result};

/// Per-run line of the JSON summary.
#[derive(Debug, Serialize)]
struct RunSummary {
    run: usize,
    generations: usize,
    best_fitness: Vec<Option<f64>>,
    migration_rounds: usize,
    invaded: usize,
    repelled: usize,
}

impl From<&EvolutionResult<RealVector>> for RunSummary {
    fn from(result: &EvolutionResult<RealVector>) -> Self {
        Self {
            run: result.run,
            generations: result.generations,
            best_fitness: result.best_fitness.clone(),
            migration_rounds: result.migration.rounds,
            invaded: result.migration.invaded,
            repelled: result.migration.repelled,
        }
    }
}

pub fn run_config(args: &RunArgs, threads: Option<usize>) -> Result<()> {
    println!("🏝️  Islevo - Running Experiment");
    println!("============================================\n");

    let mut config = load_config(&args.config, threads)?;
    if let Some(runs) = args.runs {
        config.execution.runs = runs;
    }
    if let Some(seed) = args.seed {
        config.execution.seed = Some(seed);
    }
    if let Some(path) = &args.migration_log {
        config.migration.log = Some(path.clone());
    }
    if config.execution.runs == 0 {
        anyhow::bail!("Number of runs must be greater than 0");
    }
    print_parameters(&config);

    let sim = config.build().context("Failed to assemble the orchestrator")?;
    info!(seed = sim.seed(), runs = config.execution.runs, "Orchestrator ready");

    let spinner = if args.progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let mut results = Vec::with_capacity(config.execution.runs);
    for run in 0..config.execution.runs {
        if let Some(pb) = &spinner {
            pb.set_message(format!("run {}/{}", run + 1, config.execution.runs));
        }
        let result = sim
            .evolve(run)
            .with_context(|| format!("Run {run} failed"))?;
        results.push(result);
    }
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    println!("\n📊 Results");
    for result in &results {
        print_result(result);
    }
    println!("\n✓ {} run(s) complete in {:.2?}", results.len(), start.elapsed());

    if let Some(output) = &args.output {
        let json = match args.format {
            SummaryFormat::Json => {
                let summaries: Vec<RunSummary> = results.iter().map(RunSummary::from).collect();
                serde_json::to_string_pretty(&summaries)
            }
            SummaryFormat::Full => serde_json::to_string_pretty(&results),
        }
        .context("Failed to serialize results")?;
        fs::write(output, json).with_context(|| format!("Failed to write {}", output.display()))?;
        println!("✓ Summary written to {}", output.display());
    }

    Ok(())
}
