//! Builder pattern for creating orchestrators.
//!
//! Provides a fluent API for assembling a [`CircleOfLife`] with fail-fast
//! validation: `build` either returns a complete orchestrator or the first
//! configuration error it finds.

use crate::errors::ConfigError;
use crate::genome::Genome;
use crate::simulation::migration::default_pool_size;
use crate::simulation::{
    CircleOfLife, IslandGenerator, MigrationPolicy, StoppingCondition, Topology,
};
use crate::storage::PopulationMetric;
use rand::Rng;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Builder for constructing `CircleOfLife` instances with a fluent API.
///
/// # Examples
///
/// ```
/// use islevo_sim::base::FitnessComparator;
/// use islevo_sim::evolution::{BestSelector, Evaluator, ObjectiveFunction, Sphere, WorstSelector};
/// use islevo_sim::genome::RealVector;
/// use islevo_sim::simulation::{
///     CircleOfLifeBuilder, FixedSteps, IslandConfiguration, MigrationCore, NeighborMigration,
///     RingTopology, UniformIslands, UniformRealInitializer,
/// };
/// use std::sync::Arc;
///
/// let islands = UniformIslands::new(|island| {
///     let objective: Arc<dyn ObjectiveFunction<RealVector>> = Arc::new(Sphere);
///     let init = UniformRealInitializer::new(4, -1.0, 1.0)?;
///     Ok(IslandConfiguration::new(island, Evaluator::new(objective), Arc::new(init))
///         .with_comparator(FitnessComparator::Minimize))
/// });
/// let migration = MigrationCore::new(5, Arc::new(WorstSelector), FitnessComparator::Minimize)
///     .unwrap();
///
/// let sim = CircleOfLifeBuilder::new()
///     .topology(Arc::new(RingTopology::new(4).unwrap()))
///     .islands(islands)
///     .migration(Arc::new(NeighborMigration::new(migration, Arc::new(BestSelector))))
///     .stopping(Arc::new(FixedSteps::new(10).unwrap()))
///     .subpopulation_size(20)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let result = sim.evolve(0).unwrap();
/// assert_eq!(result.generations, 10);
/// ```
pub struct CircleOfLifeBuilder<G> {
    // Required parts
    topology: Option<Arc<dyn Topology>>,
    islands: Option<Box<dyn IslandGenerator<G>>>,
    migration: Option<Arc<dyn MigrationPolicy<G>>>,
    stopping: Option<Arc<dyn StoppingCondition<G>>>,
    subpopulation_size: Option<usize>,

    // Optional parts
    metrics: Vec<Arc<dyn PopulationMetric<G>>>,
    pool_size: Option<usize>, // Default: available parallelism
    seed: Option<u64>,        // Default: None (random)
}

impl<G: Genome> Default for CircleOfLifeBuilder<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Genome> CircleOfLifeBuilder<G> {
    pub fn new() -> Self {
        Self {
            topology: None,
            islands: None,
            migration: None,
            stopping: None,
            subpopulation_size: None,
            metrics: Vec::new(),
            pool_size: None,
            seed: None,
        }
    }

    /// Set the island graph (required).
    pub fn topology(mut self, topology: Arc<dyn Topology>) -> Self {
        self.topology = Some(topology);
        self
    }

    /// Set the generator of island configurations (required).
    pub fn islands(mut self, generator: impl IslandGenerator<G> + 'static) -> Self {
        self.islands = Some(Box::new(generator));
        self
    }

    /// Set the migration policy (required).
    pub fn migration(mut self, migration: Arc<dyn MigrationPolicy<G>>) -> Self {
        self.migration = Some(migration);
        self
    }

    /// Set the stopping condition (required).
    pub fn stopping(mut self, stopping: Arc<dyn StoppingCondition<G>>) -> Self {
        self.stopping = Some(stopping);
        self
    }

    /// Set the number of individuals per island (required).
    pub fn subpopulation_size(mut self, size: usize) -> Self {
        self.subpopulation_size = Some(size);
        self
    }

    /// Register a population metric.
    pub fn metric(mut self, metric: Arc<dyn PopulationMetric<G>>) -> Self {
        self.metrics.push(metric);
        self
    }

    pub fn metrics(mut self, metrics: Vec<Arc<dyn PopulationMetric<G>>>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Set the number of workers that step islands.
    pub fn pool_size(mut self, workers: usize) -> Self {
        self.pool_size = Some(workers);
        self
    }

    /// Set the base random seed. Runs derive their own streams from it.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate every part and assemble the orchestrator.
    ///
    /// # Errors
    /// - a required part is missing
    /// - subpopulation size or pool size is 0
    /// - the generator's island count differs from the topology's
    /// - an island identity is out of range or appears twice
    pub fn build(self) -> Result<CircleOfLife<G>, ConfigError> {
        let topology = self.topology.ok_or(ConfigError::MissingRequired("topology"))?;
        let generator = self.islands.ok_or(ConfigError::MissingRequired("islands"))?;
        let migration = self.migration.ok_or(ConfigError::MissingRequired("migration"))?;
        let stopping = self.stopping.ok_or(ConfigError::MissingRequired("stopping"))?;
        let subpopulation_size = self
            .subpopulation_size
            .ok_or(ConfigError::MissingRequired("subpopulation_size"))?;

        if subpopulation_size == 0 {
            return Err(ConfigError::InvalidParameter(
                "subpopulation size must be greater than 0".into(),
            ));
        }
        let pool_size = self.pool_size.unwrap_or_else(default_pool_size);
        if pool_size == 0 {
            return Err(ConfigError::InvalidParameter(
                "pool size must be greater than 0".into(),
            ));
        }
        if migration.interval() == 0 || migration.pool_size() == 0 {
            return Err(ConfigError::InvalidParameter(
                "migration interval and pool size must be greater than 0".into(),
            ));
        }

        let expected = topology.num_islands();
        let mut islands = generator.generate(expected)?;
        if islands.len() != expected {
            return Err(ConfigError::IslandCountMismatch {
                expected,
                actual: islands.len(),
            });
        }
        let mut seen = BTreeSet::new();
        for island in &islands {
            if island.island() >= expected {
                return Err(ConfigError::IslandOutOfRange {
                    island: island.island(),
                    len: expected,
                });
            }
            if !seen.insert(island.island()) {
                return Err(ConfigError::DuplicateIsland(island.island()));
            }
        }
        islands.sort_by_key(|island| island.island());

        let seed = self.seed.unwrap_or_else(|| rand::rng().random());

        Ok(CircleOfLife {
            topology,
            islands,
            heterogeneous: generator.is_heterogeneous(),
            migration,
            stopping,
            metrics: self.metrics,
            subpopulation_size,
            pool_size,
            seed,
        })
    }
}
