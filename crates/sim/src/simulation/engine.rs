//! Island orchestrator.
//!
//! `CircleOfLife` runs the island-model loop:
//!
//! 1. build one subpopulation per island with that island's initializer;
//! 2. evaluate every initial subpopulation with its own evaluator;
//! 3. per generation: measure metrics, step every island concurrently,
//!    migrate, update the per-island best-so-far, advance the generation
//!    counter and ask the stopping condition whether to halt.
//!
//! Stepping and migration are separated by full barriers. Each run gets its
//! own worker pools, identity allocator and random stream; nothing is carried
//! over between runs except the configuration.

use crate::base::{IdAllocator, IndividualId, SimRng};
use crate::errors::EvolutionError;
use crate::evolution::OperatorContext;
use crate::genome::{Genome, Individual};
use crate::simulation::{
    IslandConfiguration, MigrationContext, MigrationPolicy, MigrationStats, Population,
    StoppingCondition, Subpopulations, Topology,
};
use crate::storage::PopulationMetric;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Outcome of one completed run.
#[derive(Debug, Serialize)]
#[serde(bound(serialize = "G: Serialize"))]
pub struct EvolutionResult<G> {
    /// Index of the run that produced this result
    pub run: usize,
    /// Number of generations executed
    pub generations: usize,
    /// Final subpopulations, one per island
    pub population: Subpopulations<G>,
    /// Best individual ever observed on each island
    pub best: Vec<Arc<Individual<G>>>,
    /// Fitness of each entry in `best`
    pub best_fitness: Vec<Option<f64>>,
    pub migration: MigrationStats,
}

impl<G> EvolutionResult<G> {
    pub fn num_islands(&self) -> usize {
        self.population.len()
    }

    /// Identities present on `island` at the end of the run.
    pub fn identities(&self, island: usize) -> BTreeSet<IndividualId> {
        self.population
            .get(island)
            .map(|members| members.iter().map(|ind| ind.id()).collect())
            .unwrap_or_default()
    }
}

/// The island orchestrator.
///
/// Built through [`crate::simulation::CircleOfLifeBuilder`], which validates
/// every part before an orchestrator exists.
#[derive(Debug)]
pub struct CircleOfLife<G: Genome> {
    pub(crate) topology: Arc<dyn Topology>,
    /// Indexed by island identity
    pub(crate) islands: Vec<IslandConfiguration<G>>,
    pub(crate) heterogeneous: bool,
    pub(crate) migration: Arc<dyn MigrationPolicy<G>>,
    pub(crate) stopping: Arc<dyn StoppingCondition<G>>,
    pub(crate) metrics: Vec<Arc<dyn PopulationMetric<G>>>,
    pub(crate) subpopulation_size: usize,
    pub(crate) pool_size: usize,
    pub(crate) seed: u64,
}

impl<G: Genome> CircleOfLife<G> {
    pub fn num_islands(&self) -> usize {
        self.islands.len()
    }

    pub fn islands(&self) -> &[IslandConfiguration<G>] {
        &self.islands
    }

    pub fn topology(&self) -> &dyn Topology {
        self.topology.as_ref()
    }

    pub fn is_heterogeneous(&self) -> bool {
        self.heterogeneous
    }

    pub fn subpopulation_size(&self) -> usize {
        self.subpopulation_size
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Random stream of `run`: the base seed advanced by `run` long jumps, so
    /// runs never share a stream.
    fn run_rng(&self, run: usize) -> SimRng {
        let mut rng = SimRng::seed_from_u64(self.seed);
        for _ in 0..run {
            rng.long_jump();
        }
        rng
    }

    fn build_pool(workers: usize, prefix: &'static str) -> Result<ThreadPool, EvolutionError> {
        ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()
            .map_err(|e| EvolutionError::ThreadPool(e.to_string()))
    }

    /// Execute run number `run` until the stopping condition fires.
    ///
    /// # Errors
    /// Any failure in a stepping or migration task aborts the run; no result
    /// is produced for it.
    #[instrument(skip(self), fields(islands = self.islands.len()))]
    pub fn evolve(&self, run: usize) -> Result<EvolutionResult<G>, EvolutionError> {
        info!(seed = self.seed, "Starting run");
        let ids = IdAllocator::new();
        let mut rng = self.run_rng(run);
        let stepping_pool = Self::build_pool(self.pool_size, "island")?;
        let migration_pool = Self::build_pool(self.migration.pool_size(), "migration")?;

        self.stopping.reset();
        for metric in &self.metrics {
            metric.reset();
        }
        for island in &self.islands {
            island.evaluator().reset();
        }

        // Init
        let subpopulations = self
            .islands
            .iter()
            .map(|island| {
                island
                    .initializer()
                    .generate_population(self.subpopulation_size, &ids, &mut rng)
            })
            .collect();
        let population = Population::new(subpopulations)?;

        // EvaluateInitial: sequential, before any cross-island comparison
        for island in &self.islands {
            let members = population.get_subpopulation(island.island())?;
            let evaluated = island.evaluator().evaluate_all(members, false)?;
            population.set_subpopulation(island.island(), evaluated)?;
        }

        let mut best_so_far = self
            .islands
            .iter()
            .map(|island| population.get_best_in(island.island(), island.comparator()))
            .collect::<Result<Vec<_>, _>>()?;
        let mut stats = MigrationStats::default();
        let islands = self.heterogeneous.then_some(self.islands.as_slice());
        let mut step = 0;

        loop {
            self.measure(&population, run, step);
            self.step_islands(&stepping_pool, &population, step, &ids, &mut rng)?;

            // Migration sees the number of the generation that just completed
            let generation = step + 1;
            if self.migration.is_due(generation) {
                let ctx = MigrationContext {
                    run,
                    islands: &self.islands,
                    ids: &ids,
                    pool: &migration_pool,
                    seed: rng.random(),
                };
                let events = self
                    .migration
                    .migrate_all(generation, &population, self.topology.as_ref(), islands, &ctx)
                    .map_err(|source| EvolutionError::Migration {
                        step: generation,
                        source,
                    })?;
                stats.record(&events);
            }

            self.update_best_so_far(&population, &mut best_so_far)?;
            step += 1;
            debug!(
                step,
                best = ?best_so_far.iter().map(|ind| ind.fitness()).collect::<Vec<_>>(),
                "Generation complete"
            );

            let done = self.stopping.stop(&population, step);
            self.flush_metrics();
            if done {
                break;
            }
        }

        // Final metrics pass
        self.measure(&population, run, step);
        self.flush_metrics();
        self.migration.flush();

        let best_fitness: Vec<Option<f64>> = best_so_far.iter().map(|ind| ind.fitness()).collect();
        info!(
            generations = step,
            invaded = stats.invaded,
            repelled = stats.repelled,
            "Run finished"
        );
        Ok(EvolutionResult {
            run,
            generations: step,
            population: population.into_subpopulations(),
            best: best_so_far,
            best_fitness,
            migration: stats,
        })
    }

    /// Execute runs `0..runs` one after another.
    pub fn evolve_runs(&self, runs: usize) -> Result<Vec<EvolutionResult<G>>, EvolutionError> {
        (0..runs).map(|run| self.evolve(run)).collect()
    }

    fn measure(&self, population: &Population<G>, run: usize, step: usize) {
        for metric in &self.metrics {
            metric.measure_population(population, run, step);
        }
    }

    fn flush_metrics(&self) {
        for metric in &self.metrics {
            metric.flush();
        }
    }

    /// Step every island on `pool` and wait for all of them.
    ///
    /// Seeds are drawn in island order before any task starts, so the result
    /// does not depend on the number of workers.
    fn step_islands(
        &self,
        pool: &ThreadPool,
        population: &Population<G>,
        step: usize,
        ids: &IdAllocator,
        rng: &mut SimRng,
    ) -> Result<(), EvolutionError> {
        let seeds: Vec<u64> = self.islands.iter().map(|_| rng.random()).collect();
        pool.install(|| {
            self.islands
                .par_iter()
                .zip(seeds.par_iter())
                .try_for_each(|(island, &seed)| {
                    Self::step_island(island, population, step, ids, seed).map_err(|source| {
                        EvolutionError::IslandTask {
                            island: island.island(),
                            step,
                            source: Box::new(source),
                        }
                    })
                })
        })
    }

    fn step_island(
        island: &IslandConfiguration<G>,
        population: &Population<G>,
        step: usize,
        ids: &IdAllocator,
        seed: u64,
    ) -> Result<(), EvolutionError> {
        let mut rng = SimRng::seed_from_u64(seed);
        let members = population.get_subpopulation(island.island())?;
        let mut ctx = OperatorContext {
            island: island.island(),
            step,
            comparator: island.comparator(),
            ids,
            rng: &mut rng,
        };
        let next = island.step(members, &mut ctx)?;
        population.set_subpopulation(island.island(), next)?;
        Ok(())
    }

    fn update_best_so_far(
        &self,
        population: &Population<G>,
        best_so_far: &mut [Arc<Individual<G>>],
    ) -> Result<(), EvolutionError> {
        for (island, best) in self.islands.iter().zip(best_so_far.iter_mut()) {
            let current = population.get_best_in(island.island(), island.comparator())?;
            if island.comparator().is_better(&current, best) {
                *best = current;
            }
        }
        Ok(())
    }
}
