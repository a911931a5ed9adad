//! Selection strategies.
//!
//! A selector picks one individual (or its index) out of a subpopulation.
//! Selectors are the building blocks used by the generational
//! `SelectionOperator` and by migration policies, which pick an emigrant from
//! the source island and a replacement slot in the target island.
//!
//! - **Best** / **Worst**: deterministic, first index on ties.
//! - **Random**: uniform over the subpopulation.
//! - **Tournament**: best of `size` uniformly drawn contestants (with
//!   replacement). Larger tournaments mean stronger selection pressure.

use crate::base::{FitnessComparator, SimRng};
use crate::errors::ConfigError;
use crate::genome::{Genome, Individual};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

/// Picks individuals out of a subpopulation.
pub trait Selector<G>: Send + Sync + Debug {
    /// Index of the selected individual, or `None` for an empty slice.
    fn select_individual_index(
        &self,
        individuals: &[Arc<Individual<G>>],
        comparator: FitnessComparator,
        rng: &mut SimRng,
    ) -> Option<usize>;

    /// The selected individual, or `None` for an empty slice.
    fn select_individual(
        &self,
        individuals: &[Arc<Individual<G>>],
        comparator: FitnessComparator,
        rng: &mut SimRng,
    ) -> Option<Arc<Individual<G>>> {
        self.select_individual_index(individuals, comparator, rng)
            .map(|idx| Arc::clone(&individuals[idx]))
    }
}

/// Always selects the best individual.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestSelector;

impl<G> Selector<G> for BestSelector {
    fn select_individual_index(
        &self,
        individuals: &[Arc<Individual<G>>],
        comparator: FitnessComparator,
        _rng: &mut SimRng,
    ) -> Option<usize> {
        comparator.best_index(individuals)
    }
}

/// Always selects the worst individual.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorstSelector;

impl<G> Selector<G> for WorstSelector {
    fn select_individual_index(
        &self,
        individuals: &[Arc<Individual<G>>],
        comparator: FitnessComparator,
        _rng: &mut SimRng,
    ) -> Option<usize> {
        comparator.worst_index(individuals)
    }
}

/// Selects uniformly at random.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl<G> Selector<G> for RandomSelector {
    fn select_individual_index(
        &self,
        individuals: &[Arc<Individual<G>>],
        _comparator: FitnessComparator,
        rng: &mut SimRng,
    ) -> Option<usize> {
        if individuals.is_empty() {
            return None;
        }
        Some(rng.random_range(0..individuals.len()))
    }
}

/// Tournament selection.
#[derive(Debug, Clone, Copy)]
pub struct TournamentSelector {
    size: usize,
}

impl TournamentSelector {
    /// Create a tournament selector.
    ///
    /// # Errors
    /// Returns an error if `size` is 0.
    pub fn new(size: usize) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::InvalidParameter(
                "tournament size must be greater than 0".into(),
            ));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl<G> Selector<G> for TournamentSelector {
    fn select_individual_index(
        &self,
        individuals: &[Arc<Individual<G>>],
        comparator: FitnessComparator,
        rng: &mut SimRng,
    ) -> Option<usize> {
        if individuals.is_empty() {
            return None;
        }
        let mut winner = rng.random_range(0..individuals.len());
        for _ in 1..self.size {
            let contestant = rng.random_range(0..individuals.len());
            if comparator.is_better(&individuals[contestant], &individuals[winner]) {
                winner = contestant;
            }
        }
        Some(winner)
    }
}

/// Serializable description of a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionStrategy {
    Best,
    Worst,
    Random,
    Tournament { size: usize },
}

impl SelectionStrategy {
    /// Build the selector this strategy describes.
    pub fn build<G: Genome>(&self) -> Result<Arc<dyn Selector<G>>, ConfigError> {
        Ok(match *self {
            Self::Best => Arc::new(BestSelector),
            Self::Worst => Arc::new(WorstSelector),
            Self::Random => Arc::new(RandomSelector),
            Self::Tournament { size } => Arc::new(TournamentSelector::new(size)?),
        })
    }
}
