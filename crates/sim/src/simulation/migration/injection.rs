use super::{MigrationContext, MigrationCore, MigrationEvent, MigrationPolicy};
use crate::base::IndividualId;
use crate::errors::{ConfigError, MigrationError};
use crate::genome::Genome;
use crate::simulation::{Initializer, IslandConfiguration, Population, Topology};
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Injects freshly initialized individuals into random islands.
///
/// Topology edges are ignored. Each event creates a new individual, evaluates
/// it with the evaluator of a randomly chosen target island and lets it
/// compete for a slot picked by the replacement selector. Newcomers are
/// always judged in the target's current landscape, whether or not the
/// islands are heterogeneous.
#[derive(Debug)]
pub struct RandomInjection<G> {
    core: MigrationCore<G>,
    initializer: Arc<dyn Initializer<G>>,
    injections: Option<usize>,
}

impl<G: Genome> RandomInjection<G> {
    /// One injection per island and round unless [`Self::with_injections`]
    /// says otherwise.
    pub fn new(core: MigrationCore<G>, initializer: Arc<dyn Initializer<G>>) -> Self {
        Self {
            core,
            initializer,
            injections: None,
        }
    }

    /// # Errors
    /// Returns an error if `injections` is 0.
    pub fn with_injections(mut self, injections: usize) -> Result<Self, ConfigError> {
        if injections == 0 {
            return Err(ConfigError::InvalidParameter(
                "number of injections must be greater than 0".into(),
            ));
        }
        self.injections = Some(injections);
        Ok(self)
    }

    pub fn core(&self) -> &MigrationCore<G> {
        &self.core
    }
}

impl<G: Genome> MigrationPolicy<G> for RandomInjection<G> {
    fn name(&self) -> &str {
        "random_injection"
    }

    fn interval(&self) -> usize {
        self.core.interval()
    }

    fn pool_size(&self) -> usize {
        self.core.pool_size()
    }

    fn migrate_all(
        &self,
        step: usize,
        population: &Population<G>,
        _topology: &dyn Topology,
        _islands: Option<&[IslandConfiguration<G>]>,
        ctx: &MigrationContext<'_, G>,
    ) -> Result<Vec<MigrationEvent>, MigrationError> {
        if !self.is_due(step) {
            return Ok(Vec::new());
        }
        let snapshot = population.snapshot();
        let len = snapshot.len();
        let count = self.injections.unwrap_or(len);
        // Identities are handed out up front so they do not depend on scheduling
        let ids: Vec<IndividualId> = (0..count).map(|_| ctx.ids.next_id()).collect();

        let events = self.core.run_events(count, ctx, |index, rng| {
            let target = rng.random_range(0..len);
            let island = self.core.island(target, ctx.islands)?;
            let comparator = island.comparator();

            let newcomer = self.initializer.generate_individual(ids[index], rng);
            let candidate = Arc::new(island.evaluator().evaluate(&newcomer)?);
            let slot = self.core.replacement_slot(&snapshot[target], target, comparator, rng)?;
            self.core
                .compete(ctx.run, step, population, None, candidate, target, slot, comparator, None)
                .map(Some)
        })?;

        debug!(step, events = events.len(), "Random injection round complete");
        Ok(events)
    }

    fn flush(&self) {
        if let Some(log) = self.core.log() {
            log.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FitnessComparator, IdAllocator, SimRng};
    use crate::evolution::{Evaluator, ObjectiveFunction, RandomSelector, ShiftedSphere, Sphere};
    use crate::genome::{Individual, RealVector};
    use crate::simulation::migration::Outcome;
    use crate::simulation::{RingTopology, UniformRealInitializer};

    /// Always produces the same far-away genome.
    #[derive(Debug)]
    struct Constant(f64);

    impl Initializer<RealVector> for Constant {
        fn generate_individual(&self, id: IndividualId, _rng: &mut SimRng) -> Individual<RealVector> {
            Individual::new(id, vec![self.0])
        }
    }

    fn population() -> Population<RealVector> {
        let member = |id: u64, x: f64| Arc::new(Individual::new(IndividualId::new(id), vec![x]).with_fitness(x * x));
        Population::new(vec![
            vec![member(0, 0.1), member(1, 0.2)],
            vec![member(2, 0.3), member(3, 0.4)],
            vec![member(4, 0.5)],
        ])
        .unwrap()
    }

    fn islands(objective: impl Fn() -> Arc<dyn ObjectiveFunction<RealVector>>) -> Vec<IslandConfiguration<RealVector>> {
        let init = Arc::new(UniformRealInitializer::new(1, -1.0, 1.0).unwrap());
        (0..3)
            .map(|island| {
                IslandConfiguration::new(island, Evaluator::new(objective()), init.clone())
                    .with_comparator(FitnessComparator::Minimize)
            })
            .collect()
    }

    fn sphere_islands() -> Vec<IslandConfiguration<RealVector>> {
        islands(|| {
            let sphere: Arc<dyn ObjectiveFunction<RealVector>> = Arc::new(Sphere);
            sphere
        })
    }

    fn policy(value: f64, always_replace: bool) -> RandomInjection<RealVector> {
        let core = MigrationCore::new(1, Arc::new(RandomSelector), FitnessComparator::Minimize)
            .unwrap()
            .with_always_replace(always_replace)
            .with_pool_size(2)
            .unwrap();
        RandomInjection::new(core, Arc::new(Constant(value)))
    }

    fn run_on(
        policy: &RandomInjection<RealVector>,
        pop: &Population<RealVector>,
        islands: &[IslandConfiguration<RealVector>],
    ) -> Vec<MigrationEvent> {
        let ids = IdAllocator::starting_at(1000);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        let ctx = MigrationContext {
            run: 0,
            islands,
            ids: &ids,
            pool: &pool,
            seed: 11,
        };
        let topology = RingTopology::new(3).unwrap();
        policy.migrate_all(1, pop, &topology, None, &ctx).unwrap()
    }

    fn run(policy: &RandomInjection<RealVector>, pop: &Population<RealVector>) -> Vec<MigrationEvent> {
        run_on(policy, pop, &sphere_islands())
    }

    #[test]
    fn test_worse_injections_are_always_repelled() {
        let pop = population();
        let before = pop.snapshot();
        let events = run(&policy(100.0, false), &pop);

        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.outcome == Outcome::Repelled));
        assert!(events.iter().all(|e| e.source_island.is_none()));
        let after = pop.snapshot();
        for (old, new) in before.iter().zip(&after) {
            let old: Vec<_> = old.iter().map(|ind| ind.id()).collect();
            let new: Vec<_> = new.iter().map(|ind| ind.id()).collect();
            assert_eq!(old, new);
        }
    }

    #[test]
    fn test_better_injections_invade() {
        let pop = population();
        let events = run(&policy(0.0, false), &pop);
        assert!(events.iter().any(|e| e.outcome == Outcome::Invaded));
        for event in &events {
            assert_eq!(event.resulting_fitness, Some(0.0));
            let best = pop.get_best_in(event.target_island, FitnessComparator::Minimize).unwrap();
            assert_eq!(best.fitness(), Some(0.0));
        }
    }

    #[test]
    fn test_injections_scored_in_current_landscape() {
        // Every island's optimum has drifted to 10.0 by now
        let islands = islands(|| {
            let drifting: Arc<dyn ObjectiveFunction<RealVector>> = Arc::new(ShiftedSphere::new(0.0, 1.0));
            drifting
        });
        for island in &islands {
            for _ in 0..10 {
                island.evaluator().advance_step();
            }
        }
        let pop = population();
        let before = pop.snapshot();

        // A newcomer at 0.0 is perfect in the initial landscape but 100 away now
        let events = run_on(&policy(0.0, false), &pop, &islands);
        assert_eq!(events.len(), 3);
        for event in &events {
            assert_eq!(event.resulting_fitness, Some(100.0));
            assert_eq!(event.outcome, Outcome::Repelled);
        }
        let after = pop.snapshot();
        for (old, new) in before.iter().zip(&after) {
            let old: Vec<_> = old.iter().map(|ind| ind.id()).collect();
            let new: Vec<_> = new.iter().map(|ind| ind.id()).collect();
            assert_eq!(old, new);
        }
    }

    #[test]
    fn test_missing_island_configuration_is_an_error() {
        let pop = population();
        let ids = IdAllocator::new();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let ctx = MigrationContext {
            run: 0,
            islands: &[],
            ids: &ids,
            pool: &pool,
            seed: 2,
        };
        let topology = RingTopology::new(3).unwrap();
        let err = policy(0.0, false)
            .migrate_all(1, &pop, &topology, None, &ctx)
            .unwrap_err();
        assert!(matches!(err, MigrationError::UnknownIsland { len: 0, .. }));
    }

    #[test]
    fn test_injection_count_and_fresh_ids() {
        let pop = population();
        let policy = policy(0.0, true).with_injections(5).unwrap();
        let events = run(&policy, &pop);
        assert_eq!(events.len(), 5);

        let fresh = pop
            .snapshot()
            .iter()
            .flatten()
            .filter(|ind| ind.id().get() >= 1000)
            .count();
        assert!(fresh >= 1);
    }

    #[test]
    fn test_zero_injections_rejected() {
        assert!(policy(0.0, false).with_injections(0).is_err());
    }
}
