pub mod init;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use islevo_sim::simulation::RunConfig;
use std::fs;
use std::path::Path;

/// Read a configuration file and apply the global thread override.
pub fn load_config(path: &Path, threads: Option<usize>) -> Result<RunConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration {}", path.display()))?;
    let mut config = RunConfig::from_json(&json)
        .with_context(|| format!("Failed to parse configuration {}", path.display()))?;
    if let Some(threads) = threads {
        config.execution.pool_size = Some(threads);
        config.migration.pool_size = Some(threads);
    }
    Ok(config)
}
