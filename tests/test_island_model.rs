//! End-to-end properties of the island loop.

use islevo::base::FitnessComparator;
use islevo::evolution::{
    BestSelector, Evaluator, GaussianMutation, ObjectiveFunction, Operator, SelectionOperator,
    Sphere, TournamentSelector, WorstSelector,
};
use islevo::genome::RealVector;
use islevo::simulation::{
    CircleOfLifeBuilder, EvolutionResult, FixedSteps, FullyConnectedTopology,
    IslandConfiguration, MigrationCore, MigrationPolicy, NeighborMigration, NoImprovement,
    Population, RandomInjection, RingTopology, Topology, UniformIslands, UniformRealInitializer,
};
use islevo::storage::{MigrationLog, PopulationMetric};
use islevo::IndividualId;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// Records structural facts about the population at every measurement.
#[derive(Debug, Default)]
struct Observer {
    initial: Mutex<Option<Vec<BTreeSet<IndividualId>>>>,
    observations: Mutex<Vec<(usize, usize, usize)>>,
}

impl Observer {
    fn initial(&self) -> Vec<BTreeSet<IndividualId>> {
        self.initial.lock().unwrap().clone().unwrap()
    }
}

impl PopulationMetric<RealVector> for Observer {
    fn name(&self) -> &str {
        "observer"
    }

    fn measure_population(&self, population: &Population<RealVector>, _run: usize, step: usize) {
        let snapshot = population.snapshot();
        let smallest = snapshot.iter().map(Vec::len).min().unwrap_or(0);
        self.observations
            .lock()
            .unwrap()
            .push((step, population.num_subpopulations(), smallest));
        let mut initial = self.initial.lock().unwrap();
        if initial.is_none() {
            *initial = Some(
                snapshot
                    .iter()
                    .map(|members| members.iter().map(|ind| ind.id()).collect())
                    .collect(),
            );
        }
    }

    fn reset(&self) {
        *self.initial.lock().unwrap() = None;
        self.observations.lock().unwrap().clear();
    }
}

fn sphere() -> Evaluator<RealVector> {
    let objective: Arc<dyn ObjectiveFunction<RealVector>> = Arc::new(Sphere);
    Evaluator::new(objective)
}

/// Island without variation operators: identities only change via migration.
fn frozen_island(island: usize) -> IslandConfiguration<RealVector> {
    let init = UniformRealInitializer::new(2, -1.0, 1.0).unwrap();
    IslandConfiguration::new(island, sphere(), Arc::new(init))
        .with_comparator(FitnessComparator::Minimize)
}

fn evolving_island(island: usize) -> IslandConfiguration<RealVector> {
    let selection: Arc<dyn Operator<RealVector>> = Arc::new(SelectionOperator::<RealVector>::new(
        Arc::new(TournamentSelector::new(2).unwrap()),
        1,
    ));
    let mutation: Arc<dyn Operator<RealVector>> =
        Arc::new(GaussianMutation::new(0.2, 0.5, -3.0, 3.0).unwrap());
    let init = UniformRealInitializer::new(3, -3.0, 3.0).unwrap();
    IslandConfiguration::new(island, sphere(), Arc::new(init))
        .with_comparator(FitnessComparator::Minimize)
        .with_operators(vec![selection, mutation])
}

fn neighbor(interval: usize, always_replace: bool) -> Arc<dyn MigrationPolicy<RealVector>> {
    let core = MigrationCore::new(interval, Arc::new(WorstSelector), FitnessComparator::Minimize)
        .unwrap()
        .with_always_replace(always_replace);
    Arc::new(NeighborMigration::new(core, Arc::new(BestSelector)))
}

fn run_frozen(
    topology: Arc<dyn Topology>,
    migration: Arc<dyn MigrationPolicy<RealVector>>,
    steps: usize,
) -> (EvolutionResult<RealVector>, Arc<Observer>) {
    let observer = Arc::new(Observer::default());
    let metric: Arc<dyn PopulationMetric<RealVector>> = observer.clone();
    let sim = CircleOfLifeBuilder::new()
        .topology(topology)
        .islands(UniformIslands::new(|island| Ok(frozen_island(island))))
        .migration(migration)
        .stopping(Arc::new(FixedSteps::new(steps).unwrap()))
        .subpopulation_size(8)
        .metric(metric)
        .seed(2024)
        .build()
        .unwrap();
    (sim.evolve(0).unwrap(), observer)
}

fn foreign(result: &EvolutionResult<RealVector>, initial: &[BTreeSet<IndividualId>], island: usize) -> usize {
    result.identities(island).difference(&initial[island]).count()
}

#[test]
fn test_island_count_and_nonempty_subpopulations_hold_every_generation() {
    let observer = Arc::new(Observer::default());
    let metric: Arc<dyn PopulationMetric<RealVector>> = observer.clone();
    let sim = CircleOfLifeBuilder::new()
        .topology(Arc::new(RingTopology::new(5).unwrap()))
        .islands(UniformIslands::new(|island| Ok(evolving_island(island))))
        .migration(neighbor(2, true))
        .stopping(Arc::new(FixedSteps::new(12).unwrap()))
        .subpopulation_size(6)
        .metric(metric)
        .seed(1)
        .build()
        .unwrap();
    let result = sim.evolve(0).unwrap();

    let observations = observer.observations.lock().unwrap().clone();
    // One measurement per generation plus the final pass
    assert_eq!(observations.len(), 13);
    for (_, islands, smallest) in observations {
        assert_eq!(islands, 5);
        assert!(smallest > 0);
    }
    assert_eq!(result.num_islands(), 5);
    assert!(result.population.iter().all(|members| members.len() == 6));
}

#[test]
fn test_migration_beyond_horizon_leaves_identities_untouched() {
    let (result, observer) = run_frozen(
        Arc::new(FullyConnectedTopology::new(4).unwrap()),
        neighbor(50, true),
        10,
    );
    let initial = observer.initial();
    for island in 0..4 {
        assert_eq!(result.identities(island), initial[island]);
    }
    assert_eq!(result.migration.rounds, 0);
}

#[test]
fn test_scenario_a_two_islands_always_replace() {
    // With two islands each one is the other's only neighbor
    let (result, observer) = run_frozen(
        Arc::new(FullyConnectedTopology::new(2).unwrap()),
        neighbor(1, true),
        1,
    );
    let initial = observer.initial();
    assert_eq!(result.generations, 1);
    for island in 0..2 {
        assert!(foreign(&result, &initial, island) >= 1, "island {island} received nobody");
    }
    assert_eq!(result.migration.invaded, 2);
}

#[test]
fn test_scenario_a_three_islands_always_replace() {
    let (result, observer) = run_frozen(
        Arc::new(FullyConnectedTopology::new(3).unwrap()),
        neighbor(1, true),
        1,
    );
    let initial = observer.initial();
    // Every event of the round invades
    assert_eq!(result.migration.invaded, 3);
    assert_eq!(result.migration.repelled, 0);
    // Targets are drawn at random. One round may send two emigrants to the same
    // island, where both take its worst slot, and leave a third island without
    // any newcomer. At least two islands always receive someone.
    let total: usize = (0..3).map(|island| foreign(&result, &initial, island)).sum();
    assert!(total >= 2);

    let (result, observer) = run_frozen(
        Arc::new(FullyConnectedTopology::new(3).unwrap()),
        neighbor(1, true),
        10,
    );
    let initial = observer.initial();
    for island in 0..3 {
        assert!(foreign(&result, &initial, island) >= 1);
    }
}

#[test]
fn test_scenario_b_fixed_budget() {
    for seed in [3, 4, 5] {
        let sim = CircleOfLifeBuilder::new()
            .topology(Arc::new(FullyConnectedTopology::new(3).unwrap()))
            .islands(UniformIslands::new(|island| Ok(evolving_island(island))))
            .migration(neighbor(2, false))
            .stopping(Arc::new(FixedSteps::new(5).unwrap()))
            .subpopulation_size(10)
            .seed(seed)
            .build()
            .unwrap();
        assert_eq!(sim.evolve(0).unwrap().generations, 5);
    }
}

#[test]
fn test_scenario_c_flat_fitness_stops_three_generations_later() {
    let sim = CircleOfLifeBuilder::new()
        .topology(Arc::new(FullyConnectedTopology::new(3).unwrap()))
        .islands(UniformIslands::new(|island| Ok(frozen_island(island))))
        .migration(neighbor(1000, false))
        .stopping(Arc::new(
            NoImprovement::new(3, FitnessComparator::Minimize).unwrap(),
        ))
        .subpopulation_size(5)
        .seed(8)
        .build()
        .unwrap();
    // First value observed after generation 1, flat afterwards
    assert_eq!(sim.evolve(0).unwrap().generations, 4);
    // Per-run state is reset
    assert_eq!(sim.evolve(1).unwrap().generations, 4);
}

#[test]
fn test_scenario_d_worse_injections_are_always_repelled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("migration.csv");
    let log = Arc::new(MigrationLog::create(&path).unwrap());

    // Sphere on [100, 101]^2 is worse than anything in [-1, 1]^2
    let core = MigrationCore::new(1, Arc::new(WorstSelector), FitnessComparator::Minimize)
        .unwrap()
        .with_log(log);
    let far = UniformRealInitializer::new(2, 100.0, 101.0).unwrap();
    let injection = RandomInjection::new(core, Arc::new(far))
        .with_injections(4)
        .unwrap();

    let (result, observer) = run_frozen(
        Arc::new(RingTopology::new(3).unwrap()),
        Arc::new(injection),
        6,
    );
    assert_eq!(result.migration.invaded, 0);
    assert_eq!(result.migration.repelled, 24);
    let initial = observer.initial();
    for island in 0..3 {
        assert_eq!(result.identities(island), initial[island]);
    }

    let contents = std::fs::read_to_string(&path).unwrap();
    let events: Vec<&str> = contents.lines().skip(1).collect();
    assert_eq!(events.len(), 24);
    assert!(events.iter().all(|line| line.ends_with(",repelled")));
}
