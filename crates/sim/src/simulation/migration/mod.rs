//! Migration between islands.
//!
//! A migration policy is invoked once per generation, after every island has
//! been stepped. It is a no-op unless the generation is a multiple of its
//! interval. When active, it schedules a batch of migration events and runs
//! them on a bounded worker pool, returning only once every event has been
//! applied.
//!
//! Every event follows the same competition rule: a candidate (an emigrant
//! from another island, or a freshly initialized individual) is evaluated in
//! the target island's environment where needed, then replaces the occupant
//! of a chosen slot if it is strictly better, or unconditionally when
//! `always_replace` is set.
//!
//! Events select their emigrant and replacement slot from a snapshot taken at
//! the start of the batch, and the final comparison happens atomically inside
//! [`Population::compete`]. Without `always_replace`, the resulting population
//! therefore does not depend on the order in which workers finish.

mod injection;
mod neighbor;

pub use injection::RandomInjection;
pub use neighbor::NeighborMigration;

use crate::base::{FitnessComparator, IdAllocator, SimRng};
use crate::errors::{ConfigError, MigrationError};
use crate::evolution::{Evaluator, Selector};
use crate::genome::{Genome, Individual};
use crate::simulation::{IslandConfiguration, Population, Topology};
use crate::storage::MigrationLog;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::sync::Arc;
use tracing::debug;

/// Result of one competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The candidate took the slot.
    Invaded,
    /// The occupant kept the slot.
    Repelled,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invaded => write!(f, "invaded"),
            Self::Repelled => write!(f, "repelled"),
        }
    }
}

/// One applied migration event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationEvent {
    /// Run the event belongs to
    pub run: usize,
    /// Generation the event belongs to
    pub step: usize,
    /// Island the candidate came from; `None` for injected individuals
    pub source_island: Option<usize>,
    /// Candidate fitness on its source island
    pub source_fitness: Option<f64>,
    pub target_island: usize,
    pub target_slot: usize,
    /// Candidate fitness in the target island's environment
    pub resulting_fitness: Option<f64>,
    /// `resulting_fitness` minus the target's best fitness before the event
    pub delta: Option<f64>,
    pub outcome: Outcome,
}

/// Running invaded/repelled counts over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStats {
    pub rounds: usize,
    pub invaded: usize,
    pub repelled: usize,
}

impl MigrationStats {
    /// Fold the events of one migration round into the counts.
    pub fn record(&mut self, events: &[MigrationEvent]) {
        self.rounds += 1;
        for event in events {
            match event.outcome {
                Outcome::Invaded => self.invaded += 1,
                Outcome::Repelled => self.repelled += 1,
            }
        }
    }

    pub fn events(&self) -> usize {
        self.invaded + self.repelled
    }
}

/// Per-invocation resources supplied by the orchestrator.
pub struct MigrationContext<'a, G> {
    /// Index of the current run
    pub run: usize,
    /// Configuration of every island, indexed by island identity. Fresh
    /// individuals are always scored with the target island's evaluator.
    pub islands: &'a [IslandConfiguration<G>],
    /// Identity source for individuals created during migration
    pub ids: &'a IdAllocator,
    /// Pool the events run on; owned by the current run
    pub pool: &'a ThreadPool,
    /// Seed for this round; events derive their own generators from it
    pub seed: u64,
}

/// Moves individuals between islands on a schedule.
pub trait MigrationPolicy<G>: Send + Sync + Debug {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Generations between migration rounds.
    fn interval(&self) -> usize;

    /// Number of workers the orchestrator should give this policy.
    fn pool_size(&self) -> usize;

    /// Whether a round is scheduled for generation `step`.
    fn is_due(&self, step: usize) -> bool {
        step % self.interval() == 0
    }

    /// Run one migration round.
    ///
    /// `islands` is `Some` when islands are heterogeneous; emigrants are then
    /// re-evaluated with the target island's evaluator before competing.
    /// Blocks until every event of the round has been applied and returns
    /// them. Returns an empty list when the round is not due.
    ///
    /// # Errors
    /// The first failing event aborts the round; events that already ran stay
    /// applied.
    fn migrate_all(
        &self,
        step: usize,
        population: &Population<G>,
        topology: &dyn Topology,
        islands: Option<&[IslandConfiguration<G>]>,
        ctx: &MigrationContext<'_, G>,
    ) -> Result<Vec<MigrationEvent>, MigrationError>;

    /// Force buffered log output to its sink.
    fn flush(&self) {}
}

/// Worker count used when none is configured.
pub fn default_pool_size() -> usize {
    std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(1)
}

/// Settings and machinery shared by every migration policy.
pub struct MigrationCore<G> {
    interval: usize,
    always_replace: bool,
    pool_size: usize,
    comparator: FitnessComparator,
    replacement: Arc<dyn Selector<G>>,
    log: Option<Arc<MigrationLog>>,
}

impl<G> Debug for MigrationCore<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationCore")
            .field("interval", &self.interval)
            .field("always_replace", &self.always_replace)
            .field("pool_size", &self.pool_size)
            .field("comparator", &self.comparator)
            .field("replacement", &self.replacement)
            .field("log", &self.log.as_ref().map(|log| log.path().to_owned()))
            .finish()
    }
}

impl<G: Genome> MigrationCore<G> {
    /// # Arguments
    /// * `interval` - Generations between rounds (must be > 0)
    /// * `replacement` - Picks the slot a candidate competes for
    /// * `comparator` - Ordering used when no island configurations are given
    ///
    /// The pool defaults to the available parallelism, `always_replace` to
    /// `false`, and no event log is written.
    ///
    /// # Errors
    /// Returns an error if `interval` is 0.
    pub fn new(
        interval: usize,
        replacement: Arc<dyn Selector<G>>,
        comparator: FitnessComparator,
    ) -> Result<Self, ConfigError> {
        if interval == 0 {
            return Err(ConfigError::InvalidParameter(
                "migration interval must be greater than 0".into(),
            ));
        }
        Ok(Self {
            interval,
            always_replace: false,
            pool_size: default_pool_size(),
            comparator,
            replacement,
            log: None,
        })
    }

    pub fn with_always_replace(mut self, always_replace: bool) -> Self {
        self.always_replace = always_replace;
        self
    }

    /// # Errors
    /// Returns an error if `pool_size` is 0.
    pub fn with_pool_size(mut self, pool_size: usize) -> Result<Self, ConfigError> {
        if pool_size == 0 {
            return Err(ConfigError::InvalidParameter(
                "migration pool size must be greater than 0".into(),
            ));
        }
        self.pool_size = pool_size;
        Ok(self)
    }

    pub fn with_log(mut self, log: Arc<MigrationLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn always_replace(&self) -> bool {
        self.always_replace
    }

    pub fn log(&self) -> Option<&Arc<MigrationLog>> {
        self.log.as_ref()
    }

    /// Configuration of `target`.
    fn island<'a>(
        &self,
        target: usize,
        islands: &'a [IslandConfiguration<G>],
    ) -> Result<&'a IslandConfiguration<G>, MigrationError> {
        islands.get(target).ok_or(MigrationError::UnknownIsland {
            island: target,
            len: islands.len(),
        })
    }

    /// Comparator and re-evaluation that apply to emigrants arriving on
    /// `target`. Homogeneous islands share one landscape, so their emigrants
    /// keep the fitness they were given at home.
    fn environment<'a>(
        &'a self,
        target: usize,
        islands: Option<&'a [IslandConfiguration<G>]>,
    ) -> Result<(FitnessComparator, Option<&'a Evaluator<G>>), MigrationError> {
        match islands {
            Some(islands) => {
                let island = self.island(target, islands)?;
                Ok((island.comparator(), Some(island.evaluator())))
            }
            None => Ok((self.comparator, None)),
        }
    }

    /// Pick a replacement slot on `target` from the round's snapshot.
    fn replacement_slot(
        &self,
        snapshot: &[Arc<Individual<G>>],
        target: usize,
        comparator: FitnessComparator,
        rng: &mut SimRng,
    ) -> Result<usize, MigrationError> {
        self.replacement
            .select_individual_index(snapshot, comparator, rng)
            .ok_or_else(|| crate::errors::PopulationError::EmptySubpopulation(target).into())
    }

    /// Evaluate `candidate` where needed and let it compete for `slot`.
    #[allow(clippy::too_many_arguments)]
    fn compete(
        &self,
        run: usize,
        step: usize,
        population: &Population<G>,
        source_island: Option<usize>,
        candidate: Arc<Individual<G>>,
        target: usize,
        slot: usize,
        comparator: FitnessComparator,
        evaluator: Option<&Evaluator<G>>,
    ) -> Result<MigrationEvent, MigrationError> {
        let source_fitness = candidate.fitness();
        let candidate = match evaluator {
            Some(evaluator) => Arc::new(evaluator.evaluate(&candidate)?),
            None => candidate,
        };
        let resulting_fitness = candidate.fitness();
        let target_best = population.get_best_in(target, comparator)?.fitness();
        let delta = resulting_fitness.zip(target_best).map(|(mine, best)| mine - best);

        let invaded = population.compete(target, slot, candidate, comparator, self.always_replace)?;
        let event = MigrationEvent {
            run,
            step,
            source_island,
            source_fitness,
            target_island: target,
            target_slot: slot,
            resulting_fitness,
            delta,
            outcome: if invaded {
                Outcome::Invaded
            } else {
                Outcome::Repelled
            },
        };
        debug!(
            run,
            step,
            source = ?source_island,
            target,
            slot,
            outcome = %event.outcome,
            "Migration event"
        );
        if let Some(log) = &self.log {
            log.record(&event);
        }
        Ok(event)
    }

    /// Run `count` events on the context's pool.
    ///
    /// Each event gets its own generator seeded from a value drawn
    /// sequentially from the round seed, so events are reproducible
    /// regardless of how many workers run them.
    fn run_events<F>(
        &self,
        count: usize,
        ctx: &MigrationContext<'_, G>,
        event: F,
    ) -> Result<Vec<MigrationEvent>, MigrationError>
    where
        F: Fn(usize, &mut SimRng) -> Result<Option<MigrationEvent>, MigrationError> + Sync,
    {
        let mut round_rng = SimRng::seed_from_u64(ctx.seed);
        let seeds: Vec<u64> = (0..count).map(|_| round_rng.random()).collect();

        let events: Vec<Option<MigrationEvent>> = ctx.pool.install(|| {
            seeds
                .par_iter()
                .enumerate()
                .map(|(index, &seed)| {
                    let mut rng = SimRng::seed_from_u64(seed);
                    event(index, &mut rng)
                })
                .collect::<Result<_, _>>()
        })?;
        Ok(events.into_iter().flatten().collect())
    }
}
