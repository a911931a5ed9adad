//! Multi-island population.
//!
//! A `Population` owns one subpopulation per island. The number of
//! subpopulations is fixed at construction and no subpopulation is ever
//! allowed to become empty. All access goes through a single reader/writer
//! lock, so a whole-subpopulation replacement and a single-slot replacement
//! can never interleave.

use crate::base::FitnessComparator;
use crate::errors::PopulationError;
use crate::genome::Individual;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Island subpopulations as plain vectors, detached from the lock.
pub type Subpopulations<G> = Vec<Vec<Arc<Individual<G>>>>;

/// A fixed number of non-empty subpopulations shared between worker tasks.
#[derive(Debug)]
pub struct Population<G> {
    subpopulations: RwLock<Subpopulations<G>>,
    islands: usize,
}

impl<G> Population<G> {
    /// Create a population from one subpopulation per island.
    ///
    /// # Errors
    /// Returns an error if there are no subpopulations or one of them is empty.
    pub fn new(subpopulations: Subpopulations<G>) -> Result<Self, PopulationError> {
        if subpopulations.is_empty() {
            return Err(PopulationError::NoSubpopulations);
        }
        if let Some(island) = subpopulations.iter().position(Vec::is_empty) {
            return Err(PopulationError::EmptySubpopulation(island));
        }
        let islands = subpopulations.len();
        Ok(Self {
            subpopulations: RwLock::new(subpopulations),
            islands,
        })
    }

    // A panicking task cannot leave a subpopulation half-written: every write
    // is a single assignment, so a poisoned lock still guards valid data.
    fn read(&self) -> RwLockReadGuard<'_, Subpopulations<G>> {
        self.subpopulations.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Subpopulations<G>> {
        self.subpopulations.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_island(&self, island: usize) -> Result<(), PopulationError> {
        if island >= self.islands {
            return Err(PopulationError::IslandOutOfBounds {
                island,
                len: self.islands,
            });
        }
        Ok(())
    }

    /// Number of islands. Never changes after construction.
    pub fn num_subpopulations(&self) -> usize {
        self.islands
    }

    /// Number of individuals on `island`.
    pub fn subpopulation_size(&self, island: usize) -> Result<usize, PopulationError> {
        self.check_island(island)?;
        Ok(self.read()[island].len())
    }

    /// Total number of individuals over all islands.
    pub fn total_size(&self) -> usize {
        self.read().iter().map(Vec::len).sum()
    }

    /// A copy of one subpopulation.
    ///
    /// Individuals are shared, the vector is not: changes made to the returned
    /// list never reach the population.
    pub fn get_subpopulation(
        &self,
        island: usize,
    ) -> Result<Vec<Arc<Individual<G>>>, PopulationError> {
        self.check_island(island)?;
        Ok(self.read()[island].clone())
    }

    /// Replace a whole subpopulation.
    ///
    /// # Errors
    /// Rejects an invalid island index or an empty list; the population is
    /// left untouched in both cases.
    pub fn set_subpopulation(
        &self,
        island: usize,
        individuals: Vec<Arc<Individual<G>>>,
    ) -> Result<(), PopulationError> {
        self.check_island(island)?;
        if individuals.is_empty() {
            return Err(PopulationError::EmptySubpopulation(island));
        }
        self.write()[island] = individuals;
        Ok(())
    }

    /// The individual at `slot` on `island`.
    pub fn get(&self, island: usize, slot: usize) -> Result<Arc<Individual<G>>, PopulationError> {
        self.check_island(island)?;
        let guard = self.read();
        let subpopulation = &guard[island];
        subpopulation
            .get(slot)
            .cloned()
            .ok_or(PopulationError::SlotOutOfBounds {
                island,
                slot,
                len: subpopulation.len(),
            })
    }

    /// Replace a single individual, returning the previous occupant.
    pub fn set(
        &self,
        island: usize,
        slot: usize,
        individual: Arc<Individual<G>>,
    ) -> Result<Arc<Individual<G>>, PopulationError> {
        self.check_island(island)?;
        let mut guard = self.write();
        let subpopulation = &mut guard[island];
        let len = subpopulation.len();
        let occupant = subpopulation
            .get_mut(slot)
            .ok_or(PopulationError::SlotOutOfBounds { island, slot, len })?;
        Ok(std::mem::replace(occupant, individual))
    }

    /// Let `candidate` compete for `slot` on `island`.
    ///
    /// The candidate takes the slot if it is strictly better than the current
    /// occupant under `comparator`, or unconditionally with `always_replace`.
    /// Comparison and replacement happen under one write lock, so concurrent
    /// competitions for the same slot always leave the best contender in it.
    ///
    /// Returns `true` if the candidate took the slot.
    pub fn compete(
        &self,
        island: usize,
        slot: usize,
        candidate: Arc<Individual<G>>,
        comparator: FitnessComparator,
        always_replace: bool,
    ) -> Result<bool, PopulationError> {
        self.check_island(island)?;
        let mut guard = self.write();
        let subpopulation = &mut guard[island];
        let len = subpopulation.len();
        let occupant = subpopulation
            .get_mut(slot)
            .ok_or(PopulationError::SlotOutOfBounds { island, slot, len })?;
        if always_replace || comparator.is_better(&candidate, occupant) {
            *occupant = candidate;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Best individual on one island.
    pub fn get_best_in(
        &self,
        island: usize,
        comparator: FitnessComparator,
    ) -> Result<Arc<Individual<G>>, PopulationError> {
        self.extreme_in(island, |individuals| comparator.best_index(individuals))
    }

    /// Worst individual on one island.
    pub fn get_worst_in(
        &self,
        island: usize,
        comparator: FitnessComparator,
    ) -> Result<Arc<Individual<G>>, PopulationError> {
        self.extreme_in(island, |individuals| comparator.worst_index(individuals))
    }

    fn extreme_in(
        &self,
        island: usize,
        pick: impl Fn(&[Arc<Individual<G>>]) -> Option<usize>,
    ) -> Result<Arc<Individual<G>>, PopulationError> {
        self.check_island(island)?;
        let guard = self.read();
        let subpopulation = &guard[island];
        pick(subpopulation)
            .map(|idx| Arc::clone(&subpopulation[idx]))
            .ok_or(PopulationError::EmptySubpopulation(island))
    }

    /// Best individual over all islands. Ties go to the lowest island.
    pub fn get_best(&self, comparator: FitnessComparator) -> Arc<Individual<G>> {
        self.extreme(|a, b| comparator.is_better(a, b))
    }

    /// Worst individual over all islands. Ties go to the lowest island.
    pub fn get_worst(&self, comparator: FitnessComparator) -> Arc<Individual<G>> {
        self.extreme(|a, b| comparator.is_better(b, a))
    }

    fn extreme(
        &self,
        replaces: impl Fn(&Individual<G>, &Individual<G>) -> bool,
    ) -> Arc<Individual<G>> {
        let guard = self.read();
        // Construction guarantees at least one non-empty subpopulation
        let mut chosen = Arc::clone(&guard[0][0]);
        for individual in guard.iter().flatten() {
            if replaces(individual, &chosen) {
                chosen = Arc::clone(individual);
            }
        }
        chosen
    }

    /// Copy of every subpopulation.
    pub fn snapshot(&self) -> Subpopulations<G> {
        self.read().clone()
    }

    /// Consume the population and return its subpopulations.
    pub fn into_subpopulations(self) -> Subpopulations<G> {
        self.subpopulations
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
