use super::{MigrationContext, MigrationCore, MigrationEvent, MigrationPolicy};
use crate::errors::{MigrationError, PopulationError};
use crate::evolution::Selector;
use crate::genome::Genome;
use crate::simulation::{IslandConfiguration, Population, Topology};
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Sends one emigrant from every island to a random neighbour.
///
/// For each source island a target is drawn uniformly from the topology's
/// neighbours of that island. The emigrant is chosen by the source selector,
/// the slot it competes for by the core's replacement selector. Islands
/// without neighbours send nobody.
#[derive(Debug)]
pub struct NeighborMigration<G> {
    core: MigrationCore<G>,
    source: Arc<dyn Selector<G>>,
}

impl<G: Genome> NeighborMigration<G> {
    pub fn new(core: MigrationCore<G>, source: Arc<dyn Selector<G>>) -> Self {
        Self { core, source }
    }

    pub fn core(&self) -> &MigrationCore<G> {
        &self.core
    }
}

impl<G: Genome> MigrationPolicy<G> for NeighborMigration<G> {
    fn name(&self) -> &str {
        "neighbor"
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
        topology: &dyn Topology,
        islands: Option<&[IslandConfiguration<G>]>,
        ctx: &MigrationContext<'_, G>,
    ) -> Result<Vec<MigrationEvent>, MigrationError> {
        if !self.is_due(step) {
            return Ok(Vec::new());
        }
        let snapshot = population.snapshot();
        let len = snapshot.len();

        let events = self.core.run_events(len, ctx, |source, rng| {
            let neighbors: Vec<usize> = topology.neighbors(source).into_iter().collect();
            if neighbors.is_empty() {
                return Ok(None);
            }
            let target = neighbors[rng.random_range(0..neighbors.len())];
            let residents = snapshot
                .get(target)
                .ok_or(MigrationError::UnknownIsland { island: target, len })?;

            let (source_comparator, _) = self.core.environment(source, islands)?;
            let emigrant = self
                .source
                .select_individual(&snapshot[source], source_comparator, rng)
                .ok_or(PopulationError::EmptySubpopulation(source))?;

            let (comparator, evaluator) = self.core.environment(target, islands)?;
            let slot = self.core.replacement_slot(residents, target, comparator, rng)?;
            self.core
                .compete(ctx.run, step, population, Some(source), emigrant, target, slot, comparator, evaluator)
                .map(Some)
        })?;

        debug!(step, events = events.len(), "Neighbor migration round complete");
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
    use crate::base::{FitnessComparator, IdAllocator, IndividualId};
    use crate::evolution::{BestSelector, Evaluator, ObjectiveFunction, Sphere, WorstSelector};
    use crate::genome::{Individual, RealVector};
    use crate::simulation::migration::Outcome;
    use crate::simulation::{FullyConnectedTopology, RingTopology, UniformRealInitializer};
    use std::collections::BTreeSet;

    fn individual(id: u64, fitness: f64) -> Arc<Individual<RealVector>> {
        Arc::new(Individual::new(IndividualId::new(id), vec![fitness]).with_fitness(fitness))
    }

    fn population() -> Population<RealVector> {
        Population::new(vec![
            vec![individual(0, 1.0), individual(1, 2.0)],
            vec![individual(2, 3.0), individual(3, 4.0)],
            vec![individual(4, 5.0), individual(5, 6.0)],
        ])
        .unwrap()
    }

    fn policy(interval: usize, always_replace: bool, workers: usize) -> NeighborMigration<RealVector> {
        let core = MigrationCore::new(interval, Arc::new(WorstSelector), FitnessComparator::Maximize)
            .unwrap()
            .with_always_replace(always_replace)
            .with_pool_size(workers)
            .unwrap();
        NeighborMigration::new(core, Arc::new(BestSelector))
    }

    fn pool(workers: usize) -> rayon::ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(workers).build().unwrap()
    }

    fn context<'a>(
        ids: &'a IdAllocator,
        pool: &'a rayon::ThreadPool,
        seed: u64,
    ) -> MigrationContext<'a, RealVector> {
        MigrationContext { run: 0, islands: &[], ids, pool, seed }
    }

    fn ids(pop: &Population<RealVector>, island: usize) -> BTreeSet<IndividualId> {
        pop.get_subpopulation(island).unwrap().iter().map(|ind| ind.id()).collect()
    }

    #[test]
    fn test_not_due_is_noop() {
        let pop = population();
        let before = pop.snapshot();
        let ids_alloc = IdAllocator::new();
        let pool = pool(2);
        let ctx = context(&ids_alloc, &pool, 1);
        let topology = FullyConnectedTopology::new(3).unwrap();

        let events = policy(4, true, 2).migrate_all(3, &pop, &topology, None, &ctx).unwrap();
        assert!(events.is_empty());
        for (island, members) in before.iter().enumerate() {
            let expected: BTreeSet<_> = members.iter().map(|ind| ind.id()).collect();
            assert_eq!(ids(&pop, island), expected);
        }
    }

    #[test]
    fn test_always_replace_spreads_emigrants() {
        let pop = population();
        let ids_alloc = IdAllocator::new();
        let pool = pool(3);
        let ctx = context(&ids_alloc, &pool, 7);
        let topology = FullyConnectedTopology::new(3).unwrap();
        let initial: Vec<BTreeSet<IndividualId>> = (0..3).map(|i| ids(&pop, i)).collect();

        let events = policy(1, true, 3).migrate_all(1, &pop, &topology, None, &ctx).unwrap();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.outcome == Outcome::Invaded));

        // Every island sent its best; at least one island received someone foreign
        let received: BTreeSet<usize> = events.iter().map(|e| e.target_island).collect();
        for island in received {
            assert!(!ids(&pop, island).is_subset(&initial[island]));
        }
        assert_eq!(pop.num_subpopulations(), 3);
    }

    #[test]
    fn test_worse_emigrant_is_repelled() {
        // Island 0 is strictly worse than its only neighbour's worst
        let pop = Population::new(vec![
            vec![individual(0, -10.0)],
            vec![individual(1, 0.0), individual(2, 1.0)],
        ])
        .unwrap();
        let ids_alloc = IdAllocator::new();
        let pool = pool(1);
        let ctx = context(&ids_alloc, &pool, 3);
        let topology = RingTopology::new(2).unwrap();

        let events = policy(1, false, 1).migrate_all(1, &pop, &topology, None, &ctx).unwrap();
        let from_zero = events.iter().find(|e| e.source_island == Some(0)).unwrap();
        assert_eq!(from_zero.outcome, Outcome::Repelled);
        assert_eq!(from_zero.delta, Some(-11.0));
        assert_eq!(ids(&pop, 1), BTreeSet::from([IndividualId::new(1), IndividualId::new(2)]));
    }

    #[test]
    fn test_heterogeneous_islands_reevaluate_emigrants() {
        let pop = Population::new(vec![
            vec![individual(0, 100.0)],
            vec![individual(1, 50.0)],
        ])
        .unwrap();
        let sphere: Arc<dyn ObjectiveFunction<RealVector>> = Arc::new(Sphere);
        let init = Arc::new(UniformRealInitializer::new(1, -1.0, 1.0).unwrap());
        let islands = vec![
            crate::simulation::IslandConfiguration::new(0, Evaluator::new(sphere.clone()), init.clone()),
            crate::simulation::IslandConfiguration::new(1, Evaluator::new(sphere), init),
        ];
        let ids_alloc = IdAllocator::new();
        let pool = pool(1);
        let ctx = MigrationContext {
            run: 0,
            islands: islands.as_slice(),
            ids: &ids_alloc,
            pool: &pool,
            seed: 5,
        };
        let topology = FullyConnectedTopology::new(2).unwrap();

        let events = policy(1, false, 1)
            .migrate_all(2, &pop, &topology, Some(islands.as_slice()), &ctx)
            .unwrap();
        let from_zero = events.iter().find(|e| e.source_island == Some(0)).unwrap();
        assert_eq!(from_zero.source_fitness, Some(100.0));
        // Genome [100.0] under the sphere objective
        assert_eq!(from_zero.resulting_fitness, Some(10_000.0));
    }

    #[test]
    fn test_interval_gating() {
        let migration = policy(3, false, 1);
        assert!(migration.is_due(3));
        assert!(migration.is_due(6));
        assert!(!migration.is_due(4));
        assert!(MigrationCore::<RealVector>::new(0, Arc::new(WorstSelector), FitnessComparator::Maximize).is_err());
    }
}
