mod args;
mod commands;
mod printing;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use args::{InitArgs, RunArgs, ValidateArgs};
use commands::{init, run, validate};

/// Islevo: island-model evolutionary search
///
/// Evolves several subpopulations ("islands") side by side and periodically
/// lets individuals migrate between them.
#[derive(Parser, Debug)]
#[command(name = "islevo")]
#[command(author, version, about = "Runs island-model evolution experiments", long_about = None)]
struct Cli {
    /// Number of worker threads for stepping islands and migrating
    ///
    /// Overrides both pool sizes of the configuration.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Log every generation and migration event
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default run configuration.
    ///
    /// The result is a JSON file you can edit before calling `run`.
    Init(InitArgs),

    /// Check a configuration without running it.
    Validate(ValidateArgs),

    /// Run one or more independent runs of a configuration.
    Run(RunArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init(args) => init::write_default_config(&args),
        Commands::Validate(args) => validate::validate_config(&args, cli.threads),
        Commands::Run(args) => run::run_config(&args, cli.threads),
    }
}
