use islevo_sim::genome::RealVector;
use islevo_sim::simulation::{
    EvolutionResult, MigrationKind, RunConfig, StoppingConfig, TopologyConfig,
};

pub fn print_parameters(config: &RunConfig) {
    let execution = &config.execution;
    println!("\n📋 Run Configuration");
    println!("  • Subpopulation Size: {}", execution.subpopulation_size);
    match execution.pool_size {
        Some(workers) => println!("  • Workers: {workers} [-t, --threads]"),
        None => println!("  • Workers: all cores [-t, --threads]"),
    }
    match execution.seed {
        Some(seed) => println!("  • Random Seed: {seed} [--seed]"),
        None => println!("  • Random Seed: Random [--seed]"),
    }
    println!("  • Runs: {} [--runs]", execution.runs);

    println!("\n🏝️  Islands");
    match config.topology {
        TopologyConfig::FullyConnected { islands } => {
            println!("  • Topology: fully connected, {islands} islands")
        }
        TopologyConfig::Ring { islands } => println!("  • Topology: ring, {islands} islands"),
    }
    if config.islands.len() == 1 {
        println!("  • Homogeneous: every island uses the entry below");
    }
    for (index, entry) in config.islands.iter().enumerate() {
        println!(
            "  • [{index}] {:?} (dim {}, [{}, {}]), {:?}, sigma {}, rate {}, elitism {}",
            entry.objective,
            entry.dimension,
            entry.lower,
            entry.upper,
            entry.comparator,
            entry.mutation_sigma,
            entry.mutation_rate,
            entry.elitism
        );
    }

    let migration = &config.migration;
    println!("\n🔀 Migration");
    let kind = match migration.kind {
        MigrationKind::Neighbor => "neighbor",
        MigrationKind::RandomInjection => "random injection",
    };
    println!("  • Policy: {kind}, every {} generations", migration.interval);
    println!(
        "  • Replacement: {:?}{}",
        migration.replacement_selection,
        if migration.always_replace { " (always replace)" } else { "" }
    );
    if let Some(log) = &migration.log {
        println!("  • Event Log: {} [--migration-log]", log.display());
    }

    println!("\n🛑 Stopping");
    match config.stopping {
        StoppingConfig::FixedSteps { steps } => println!("  • After {steps} generations"),
        StoppingConfig::NoImprovement { window } => {
            println!("  • After {window} generations without improvement")
        }
    }
}

fn format_fitness(fitness: Option<f64>) -> String {
    fitness.map_or_else(|| "-".to_string(), |f| format!("{f:.6e}"))
}

pub fn print_result(result: &EvolutionResult<RealVector>) {
    println!(
        "  Run {}: {} generations, {} migrations ({} invaded, {} repelled)",
        result.run,
        result.generations,
        result.migration.events(),
        result.migration.invaded,
        result.migration.repelled
    );
    for (island, fitness) in result.best_fitness.iter().enumerate() {
        println!("    island {island}: best {}", format_fitness(*fitness));
    }
}
