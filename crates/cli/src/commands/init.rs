use anyhow::{Context, Result};
use islevo_sim::simulation::RunConfig;
use std::fs;

use crate::args::InitArgs;
use crate::printing::print_parameters;

pub fn write_default_config(args: &InitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            args.output.display()
        );
    }

    let config = RunConfig::default();
    let json = config
        .to_json_pretty()
        .context("Failed to serialize configuration")?;
    fs::write(&args.output, json)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    print_parameters(&config);
    println!("\n✓ Configuration written to {}", args.output.display());
    Ok(())
}
