//! Mutation of real-valued genomes.
//!
//! `GaussianMutation` perturbs each gene independently with probability
//! `rate` by a normally distributed step of standard deviation `sigma`, then
//! clamps the result to the search bounds. A mutated genome becomes a new
//! individual with a fresh identity and its parent recorded; individuals that
//! draw no mutation pass through untouched (same identity, fitness kept).

use crate::base::SimRng;
use crate::errors::{ConfigError, OperatorError};
use crate::evolution::{Operator, OperatorContext};
use crate::genome::{Individual, RealVector};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-gene Gaussian mutation with bound clamping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianMutation {
    sigma: f64,
    rate: f64,
    lower: f64,
    upper: f64,
}

impl GaussianMutation {
    /// Create a Gaussian mutation operator.
    ///
    /// # Arguments
    /// * `sigma` - Standard deviation of the perturbation (must be > 0)
    /// * `rate` - Per-gene mutation probability (0.0..=1.0)
    /// * `lower`, `upper` - Search bounds genes are clamped to
    ///
    /// # Errors
    /// Returns an error if a parameter is outside its valid range.
    pub fn new(sigma: f64, rate: f64, lower: f64, upper: f64) -> Result<Self, ConfigError> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(ConfigError::InvalidParameter(format!(
                "mutation sigma must be positive, got {sigma}"
            )));
        }
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::InvalidParameter(format!(
                "mutation rate must be between 0.0 and 1.0, got {rate}"
            )));
        }
        if !(lower < upper) {
            return Err(ConfigError::InvalidParameter(format!(
                "mutation bounds must satisfy lower < upper, got [{lower}, {upper}]"
            )));
        }
        Ok(Self {
            sigma,
            rate,
            lower,
            upper,
        })
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Mutate `genome`, returning `None` if no gene changed.
    fn mutate_genome(&self, genome: &RealVector, rng: &mut SimRng) -> Option<RealVector> {
        // sigma is validated positive, so construction cannot fail
        let normal = Normal::new(0.0, self.sigma).ok()?;
        let mut mutated: Option<RealVector> = None;
        for (i, &gene) in genome.iter().enumerate() {
            if rng.random::<f64>() < self.rate {
                let child = mutated.get_or_insert_with(|| genome.clone());
                child[i] = (gene + normal.sample(rng)).clamp(self.lower, self.upper);
            }
        }
        mutated
    }
}

impl Operator<RealVector> for GaussianMutation {
    fn name(&self) -> &str {
        "gaussian_mutation"
    }

    fn apply(
        &self,
        individuals: Vec<Arc<Individual<RealVector>>>,
        ctx: &mut OperatorContext<'_>,
    ) -> Result<Vec<Arc<Individual<RealVector>>>, OperatorError> {
        if individuals.is_empty() {
            return Err(OperatorError::EmptyInput);
        }
        Ok(individuals
            .into_iter()
            .map(|parent| match self.mutate_genome(parent.genome(), &mut *ctx.rng) {
                Some(genome) => Arc::new(Individual::offspring(ctx.ids.next_id(), genome, vec![parent.id()])),
                None => parent,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FitnessComparator, IdAllocator, IndividualId};
    use rand::SeedableRng;

    fn context<'a>(ids: &'a IdAllocator, rng: &'a mut SimRng) -> OperatorContext<'a> {
        OperatorContext {
            island: 0,
            step: 0,
            comparator: FitnessComparator::Minimize,
            ids,
            rng,
        }
    }

    #[test]
    fn test_new_validates_parameters() {
        assert!(GaussianMutation::new(0.0, 0.5, -1.0, 1.0).is_err());
        assert!(GaussianMutation::new(0.1, 1.5, -1.0, 1.0).is_err());
        assert!(GaussianMutation::new(0.1, 0.5, 1.0, 1.0).is_err());
        assert!(GaussianMutation::new(0.1, 0.5, -1.0, 1.0).is_ok());
    }

    #[test]
    fn test_full_rate_creates_offspring_within_bounds() {
        let ids = IdAllocator::starting_at(100);
        let mut rng = SimRng::seed_from_u64(42);
        let mut ctx = context(&ids, &mut rng);

        let op = GaussianMutation::new(10.0, 1.0, -1.0, 1.0).unwrap();
        let parent = Arc::new(Individual::new(IndividualId::new(1), vec![0.0; 8]).with_fitness(0.0));
        let out = op.apply(vec![parent], &mut ctx).unwrap();

        assert_eq!(out.len(), 1);
        let child = &out[0];
        assert_eq!(child.id(), IndividualId::new(100));
        assert_eq!(child.parents(), &[IndividualId::new(1)]);
        assert!(!child.is_evaluated());
        assert!(child.genome().iter().all(|g| (-1.0..=1.0).contains(g)));
    }

    #[test]
    fn test_zero_rate_passes_individuals_through() {
        let ids = IdAllocator::new();
        let mut rng = SimRng::seed_from_u64(42);
        let mut ctx = context(&ids, &mut rng);

        let op = GaussianMutation::new(1.0, 0.0, -5.0, 5.0).unwrap();
        let parent = Arc::new(Individual::new(IndividualId::new(7), vec![1.0, 2.0]).with_fitness(5.0));
        let out = op.apply(vec![parent.clone()], &mut ctx).unwrap();

        assert!(Arc::ptr_eq(&out[0], &parent));
        assert_eq!(ids.allocated(), 0);
    }

    #[test]
    fn test_mutation_is_reproducible_with_seed() {
        let op = GaussianMutation::new(0.5, 0.5, -5.0, 5.0).unwrap();
        let run = || {
            let ids = IdAllocator::new();
            let mut rng = SimRng::seed_from_u64(9);
            let mut ctx = context(&ids, &mut rng);
            let pop = (0..4)
                .map(|i| Arc::new(Individual::new(IndividualId::new(i), vec![0.0; 4])))
                .collect();
            op.apply(pop, &mut ctx)
                .unwrap()
                .iter()
                .map(|ind| ind.genome().clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
