use anyhow::{Context, Result};

use super::load_config;
use crate::args::ValidateArgs;
use crate::printing::print_parameters;

pub fn validate_config(args: &ValidateArgs, threads: Option<usize>) -> Result<()> {
    println!("🔍 Validating configuration: {}", args.config.display());

    let config = load_config(&args.config, threads)?;
    config
        .validate()
        .context("Configuration does not assemble")?;

    print_parameters(&config);
    println!("\n✓ Configuration is valid");
    Ok(())
}
