//! Best-effort CSV log of migration events.
//!
//! One row per event:
//! `run,step,source_island,source_fitness,target_island,resulting_fitness,delta,outcome`.
//! Injected individuals have no source island and leave that column empty.
//! Write failures are reported through `tracing` and otherwise ignored; they
//! never affect the competition itself.

use crate::simulation::{MigrationEvent, Outcome};
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Columns written once at the top of every log.
pub const MIGRATION_LOG_HEADER: [&str; 8] = [
    "run",
    "step",
    "source_island",
    "source_fitness",
    "target_island",
    "resulting_fitness",
    "delta",
    "outcome",
];

/// Flat row layout; field order matches [`MIGRATION_LOG_HEADER`].
#[derive(Serialize)]
struct LogRecord {
    run: usize,
    step: usize,
    source_island: Option<usize>,
    source_fitness: Option<f64>,
    target_island: usize,
    resulting_fitness: Option<f64>,
    delta: Option<f64>,
    outcome: Outcome,
}

impl From<&MigrationEvent> for LogRecord {
    fn from(event: &MigrationEvent) -> Self {
        Self {
            run: event.run,
            step: event.step,
            source_island: event.source_island,
            source_fitness: event.source_fitness,
            target_island: event.target_island,
            resulting_fitness: event.resulting_fitness,
            delta: event.delta,
            outcome: event.outcome,
        }
    }
}

/// Serialized sink shared by every migration worker.
///
/// One log may be shared by all runs of an orchestrator; the `run` column
/// tells their rows apart.
pub struct MigrationLog {
    path: PathBuf,
    writer: Mutex<Writer<Box<dyn Write + Send>>>,
}

impl MigrationLog {
    /// Create (or truncate) a log file at `path` and write the header.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        Self::from_writer(path, Box::new(file))
    }

    /// Log to an arbitrary writer. `label` is only used in diagnostics.
    pub fn from_writer(label: impl Into<PathBuf>, writer: Box<dyn Write + Send>) -> io::Result<Self> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
        writer.write_record(MIGRATION_LOG_HEADER)?;
        Ok(Self {
            path: label.into(),
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event.
    pub fn record(&self, event: &MigrationEvent) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writer.serialize(LogRecord::from(event)) {
            warn!(path = %self.path.display(), error = %e, "Failed to write migration event");
        }
    }

    pub fn flush(&self) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writer.flush() {
            warn!(path = %self.path.display(), error = %e, "Failed to flush migration log");
        }
    }
}
