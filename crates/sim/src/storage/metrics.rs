//! Population metrics.
//!
//! Metrics are measured once per generation against the whole multi-island
//! population. They are reset at the start of each run and flushed at the end
//! of every generation.

use crate::base::FitnessComparator;
use crate::simulation::Population;
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Observer of the population between generations.
pub trait PopulationMetric<G>: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Record the state of `population` before generation `step` of run
    /// `run` executes.
    fn measure_population(&self, population: &Population<G>, run: usize, step: usize);

    /// Push buffered output to its sink.
    fn flush(&self) {}

    /// Forget everything measured so far.
    fn reset(&self) {}
}

/// Fitness statistics of one island at one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessSummary {
    pub run: usize,
    pub step: usize,
    pub island: usize,
    pub best: f64,
    pub mean: f64,
    pub worst: f64,
}

/// Best, mean and worst fitness per island.
///
/// Without a sink, summaries are kept in memory until the next reset. With a
/// sink they are written as CSV (`run,step,island,best,mean,worst`) and not
/// retained. Unevaluated individuals are skipped; an island without any
/// evaluated individual produces no row.
pub struct FitnessSummaryMetric {
    comparator: FitnessComparator,
    summaries: Mutex<Vec<FitnessSummary>>,
    sink: Option<Mutex<Writer<Box<dyn Write + Send>>>>,
}

impl Debug for FitnessSummaryMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitnessSummaryMetric")
            .field("comparator", &self.comparator)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

impl FitnessSummaryMetric {
    /// Keep summaries in memory only.
    pub fn new(comparator: FitnessComparator) -> Self {
        Self {
            comparator,
            summaries: Mutex::new(Vec::new()),
            sink: None,
        }
    }

    /// Write every summary to `writer` instead of keeping it.
    pub fn with_writer(comparator: FitnessComparator, writer: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Some(Mutex::new(Writer::from_writer(writer))),
            ..Self::new(comparator)
        }
    }

    /// Write summaries to a CSV file at `path`.
    pub fn to_file(comparator: FitnessComparator, path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::with_writer(comparator, Box::new(file)))
    }

    /// Everything measured since the last reset. Always empty when a sink is
    /// attached.
    pub fn summaries(&self) -> Vec<FitnessSummary> {
        self.summaries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn summarize<G>(&self, population: &Population<G>, run: usize, step: usize) -> Vec<FitnessSummary> {
        population
            .snapshot()
            .iter()
            .enumerate()
            .filter_map(|(island, members)| {
                let values: Vec<f64> = members.iter().filter_map(|ind| ind.fitness()).collect();
                let first = *values.first()?;
                let (mut best, mut worst) = (first, first);
                for &value in &values[1..] {
                    if self.comparator.is_better_value(value, best) {
                        best = value;
                    }
                    if self.comparator.is_better_value(worst, value) {
                        worst = value;
                    }
                }
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                Some(FitnessSummary {
                    run,
                    step,
                    island,
                    best,
                    mean,
                    worst,
                })
            })
            .collect()
    }

    fn write_rows(sink: &Mutex<Writer<Box<dyn Write + Send>>>, rows: &[FitnessSummary]) -> csv::Result<()> {
        let mut writer = sink.lock().unwrap_or_else(PoisonError::into_inner);
        for row in rows {
            writer.serialize(row)?;
        }
        Ok(())
    }
}

impl<G> PopulationMetric<G> for FitnessSummaryMetric {
    fn name(&self) -> &str {
        "fitness_summary"
    }

    fn measure_population(&self, population: &Population<G>, run: usize, step: usize) {
        let rows = self.summarize(population, run, step);
        match &self.sink {
            Some(sink) => {
                if let Err(e) = Self::write_rows(sink, &rows) {
                    warn!(error = %e, run, step, "Failed to write fitness summary");
                }
            }
            None => self
                .summaries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend(rows),
        }
    }

    fn flush(&self) {
        if let Some(sink) = &self.sink {
            let mut writer = sink.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = writer.flush() {
                warn!(error = %e, "Failed to flush fitness summary");
            }
        }
    }

    fn reset(&self) {
        self.summaries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
