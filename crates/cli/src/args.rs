use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Output configuration file
    #[arg(short, long, default_value = "islevo.json")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration file
    #[arg(short, long, default_value = "islevo.json")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration file
    #[arg(short, long, default_value = "islevo.json")]
    pub config: PathBuf,

    /// Override the number of independent runs
    #[arg(long)]
    pub runs: Option<usize>,

    /// Override the random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write every migration event to this CSV file
    #[arg(long)]
    pub migration_log: Option<PathBuf>,

    /// Show a spinner while runs execute
    #[arg(long)]
    pub progress: bool,

    /// Write a summary of every run to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Summary format
    #[arg(long, value_enum, default_value_t = SummaryFormat::Json)]
    pub format: SummaryFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    /// Per-run summary only
    Json,
    /// Per-run summary plus the final population
    Full,
}
