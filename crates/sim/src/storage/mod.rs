//! Output sinks for a run.
//!
//! This module provides the migration event log and population metrics. Both
//! are best-effort: write failures are reported through `tracing` and never
//! abort a run.

mod metrics;
mod migration_log;

pub use metrics::{FitnessSummary, FitnessSummaryMetric, PopulationMetric};
pub use migration_log::{MigrationLog, MIGRATION_LOG_HEADER};
