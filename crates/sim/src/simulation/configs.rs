//! Run configuration.
//!
//! This module provides the serializable description of a run: execution
//! settings, topology, one entry per island, migration, stopping condition
//! and metrics. [`RunConfig::build`] turns it into a ready-to-run
//! [`CircleOfLife`] by plain composition of the library types.

use crate::base::FitnessComparator;
use crate::errors::ConfigError;
use crate::evolution::{
    Evaluator, GaussianMutation, ObjectiveFunction, Operator, Rastrigin, SelectionOperator,
    SelectionStrategy, ShiftedSphere, Sphere,
};
use crate::genome::RealVector;
use crate::simulation::{
    CircleOfLife, CircleOfLifeBuilder, ExplicitIslands, FixedSteps, FullyConnectedTopology,
    IslandConfiguration, MigrationCore, MigrationPolicy, NeighborMigration, NoImprovement,
    RandomInjection, RingTopology, StoppingCondition, Topology, UniformIslands,
    UniformRealInitializer,
};
use crate::storage::{FitnessSummaryMetric, MigrationLog, PopulationMetric};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// The master configuration struct.
/// Can be deserialized from a file to fully reproduce a run setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub execution: ExecutionConfig,
    pub topology: TopologyConfig,
    /// One entry per island, or a single entry shared by every island
    pub islands: Vec<IslandSpec>,
    pub migration: MigrationConfig,
    pub stopping: StoppingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// High-level execution parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Number of individuals per island
    pub subpopulation_size: usize,
    /// Workers stepping islands (default: available parallelism)
    #[serde(default)]
    pub pool_size: Option<usize>,
    /// Optional RNG seed for reproducibility
    #[serde(default)]
    pub seed: Option<u64>,
    /// Number of independent runs
    #[serde(default = "default_runs")]
    pub runs: usize,
}

fn default_runs() -> usize {
    1
}

/// Island graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologyConfig {
    FullyConnected { islands: usize },
    Ring { islands: usize },
}

impl TopologyConfig {
    pub fn num_islands(&self) -> usize {
        match *self {
            Self::FullyConnected { islands } | Self::Ring { islands } => islands,
        }
    }

    pub fn build(&self) -> Result<Arc<dyn Topology>, ConfigError> {
        Ok(match *self {
            Self::FullyConnected { islands } => Arc::new(FullyConnectedTopology::new(islands)?),
            Self::Ring { islands } => Arc::new(RingTopology::new(islands)?),
        })
    }
}

/// Bundled objective functions on real vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    Sphere,
    Rastrigin,
    ShiftedSphere,
}

/// Description of one island.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IslandSpec {
    pub objective: ObjectiveKind,
    /// Genome length
    pub dimension: usize,
    /// Search bounds for initialization and mutation
    pub lower: f64,
    pub upper: f64,
    /// Optimum location of the shifted sphere
    #[serde(default)]
    pub shift: f64,
    /// Optimum drift per generation of the shifted sphere (0 = static)
    #[serde(default)]
    pub drift: f64,
    pub mutation_sigma: f64,
    pub mutation_rate: f64,
    pub selection: SelectionStrategy,
    #[serde(default)]
    pub elitism: usize,
    #[serde(default = "default_comparator")]
    pub comparator: FitnessComparator,
}

fn default_comparator() -> FitnessComparator {
    FitnessComparator::Minimize
}

impl IslandSpec {
    /// A fresh objective instance; dynamic objectives are never shared.
    pub fn objective(&self) -> Arc<dyn ObjectiveFunction<RealVector>> {
        match self.objective {
            ObjectiveKind::Sphere => Arc::new(Sphere),
            ObjectiveKind::Rastrigin => Arc::new(Rastrigin),
            ObjectiveKind::ShiftedSphere => Arc::new(ShiftedSphere::new(self.shift, self.drift)),
        }
    }

    pub fn evaluator(&self) -> Evaluator<RealVector> {
        Evaluator::new(self.objective())
    }

    pub fn initializer(&self) -> Result<UniformRealInitializer, ConfigError> {
        UniformRealInitializer::new(self.dimension, self.lower, self.upper)
    }

    /// Island `island`: selection followed by Gaussian mutation.
    pub fn build(&self, island: usize) -> Result<IslandConfiguration<RealVector>, ConfigError> {
        let selection: Arc<dyn Operator<RealVector>> = Arc::new(SelectionOperator::new(
            self.selection.build::<RealVector>()?,
            self.elitism,
        ));
        let mutation: Arc<dyn Operator<RealVector>> = Arc::new(GaussianMutation::new(
            self.mutation_sigma,
            self.mutation_rate,
            self.lower,
            self.upper,
        )?);
        Ok(
            IslandConfiguration::new(island, self.evaluator(), Arc::new(self.initializer()?))
                .with_comparator(self.comparator)
                .with_operators(vec![selection, mutation]),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationKind {
    Neighbor,
    RandomInjection,
}

/// Migration policy parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationConfig {
    pub kind: MigrationKind,
    /// Generations between migration rounds
    pub interval: usize,
    #[serde(default = "default_source_selection")]
    pub source_selection: SelectionStrategy,
    #[serde(default = "default_replacement_selection")]
    pub replacement_selection: SelectionStrategy,
    #[serde(default)]
    pub always_replace: bool,
    /// CSV file receiving one line per migration event
    #[serde(default)]
    pub log: Option<PathBuf>,
    /// Migration workers (default: available parallelism)
    #[serde(default)]
    pub pool_size: Option<usize>,
    /// Injections per round for random injection (default: island count)
    #[serde(default)]
    pub injections: Option<usize>,
}

fn default_source_selection() -> SelectionStrategy {
    SelectionStrategy::Best
}

fn default_replacement_selection() -> SelectionStrategy {
    SelectionStrategy::Worst
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoppingConfig {
    FixedSteps { steps: usize },
    NoImprovement { window: usize },
}

impl StoppingConfig {
    pub fn build<G>(&self, comparator: FitnessComparator) -> Result<Arc<dyn StoppingCondition<G>>, ConfigError> {
        Ok(match *self {
            Self::FixedSteps { steps } => Arc::new(FixedSteps::new(steps)?),
            Self::NoImprovement { window } => Arc::new(NoImprovement::new(window, comparator)?),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// CSV file receiving per-island fitness summaries
    #[serde(default)]
    pub fitness_summary: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            execution: ExecutionConfig {
                subpopulation_size: 50,
                pool_size: None,
                seed: Some(42),
                runs: 1,
            },
            topology: TopologyConfig::Ring { islands: 4 },
            islands: vec![IslandSpec {
                objective: ObjectiveKind::Sphere,
                dimension: 10,
                lower: -5.12,
                upper: 5.12,
                shift: 0.0,
                drift: 0.0,
                mutation_sigma: 0.3,
                mutation_rate: 0.1,
                selection: SelectionStrategy::Tournament { size: 3 },
                elitism: 1,
                comparator: FitnessComparator::Minimize,
            }],
            migration: MigrationConfig {
                kind: MigrationKind::Neighbor,
                interval: 10,
                source_selection: SelectionStrategy::Best,
                replacement_selection: SelectionStrategy::Worst,
                always_replace: false,
                log: None,
                pool_size: None,
                injections: None,
            },
            stopping: StoppingConfig::FixedSteps { steps: 100 },
            metrics: MetricsConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check that the configuration assembles, without opening any output
    /// file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.assemble(false).map(|_| ())
    }

    /// Assemble the orchestrator, opening the configured output files.
    ///
    /// Output files that cannot be created are reported and skipped.
    pub fn build(&self) -> Result<CircleOfLife<RealVector>, ConfigError> {
        self.assemble(true)
    }

    fn assemble(&self, sinks: bool) -> Result<CircleOfLife<RealVector>, ConfigError> {
        let first = self
            .islands
            .first()
            .ok_or(ConfigError::MissingRequired("islands"))?;
        let comparator = first.comparator;
        let topology = self.topology.build()?;

        let mut builder = CircleOfLifeBuilder::new()
            .topology(topology)
            .migration(self.migration(first, sinks)?)
            .stopping(self.stopping.build(comparator)?)
            .subpopulation_size(self.execution.subpopulation_size);
        builder = if self.islands.len() == 1 {
            let entry = first.clone();
            builder.islands(UniformIslands::new(move |island| entry.build(island)))
        } else {
            let islands = self
                .islands
                .iter()
                .enumerate()
                .map(|(island, entry)| entry.build(island))
                .collect::<Result<Vec<_>, _>>()?;
            builder.islands(ExplicitIslands::new(islands))
        };
        if let Some(workers) = self.execution.pool_size {
            builder = builder.pool_size(workers);
        }
        if let Some(seed) = self.execution.seed {
            builder = builder.seed(seed);
        }
        if sinks {
            if let Some(path) = &self.metrics.fitness_summary {
                match FitnessSummaryMetric::to_file(comparator, path) {
                    Ok(metric) => {
                        let metric: Arc<dyn PopulationMetric<RealVector>> = Arc::new(metric);
                        builder = builder.metric(metric);
                    }
                    Err(e) => warn!(path = %path.display(), error = %e, "Fitness summary disabled"),
                }
            }
        }
        builder.build()
    }

    fn migration(
        &self,
        first: &IslandSpec,
        sinks: bool,
    ) -> Result<Arc<dyn MigrationPolicy<RealVector>>, ConfigError> {
        let settings = &self.migration;
        let mut core = MigrationCore::new(
            settings.interval,
            settings.replacement_selection.build()?,
            first.comparator,
        )?
        .with_always_replace(settings.always_replace);
        if let Some(workers) = settings.pool_size {
            core = core.with_pool_size(workers)?;
        }
        if sinks {
            if let Some(path) = &settings.log {
                match MigrationLog::create(path) {
                    Ok(log) => core = core.with_log(Arc::new(log)),
                    Err(e) => warn!(path = %path.display(), error = %e, "Migration log disabled"),
                }
            }
        }

        Ok(match settings.kind {
            MigrationKind::Neighbor => Arc::new(NeighborMigration::new(
                core,
                settings.source_selection.build()?,
            )),
            MigrationKind::RandomInjection => {
                let policy = RandomInjection::new(core, Arc::new(first.initializer()?));
                match settings.injections {
                    Some(count) => Arc::new(policy.with_injections(count)?),
                    None => Arc::new(policy),
                }
            }
        })
    }
}
