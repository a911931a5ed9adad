//! Creation of initial individuals.

use crate::base::{IdAllocator, IndividualId, SimRng};
use crate::errors::ConfigError;
use crate::genome::{Individual, RealVector};
use rand::Rng;
use std::fmt::Debug;
use std::sync::Arc;

/// Produces brand-new, unevaluated individuals.
pub trait Initializer<G>: Send + Sync + Debug {
    /// Create one individual with the given identity.
    fn generate_individual(&self, id: IndividualId, rng: &mut SimRng) -> Individual<G>;

    /// Create `size` individuals, drawing identities from `ids`.
    fn generate_population(
        &self,
        size: usize,
        ids: &IdAllocator,
        rng: &mut SimRng,
    ) -> Vec<Arc<Individual<G>>> {
        (0..size)
            .map(|_| Arc::new(self.generate_individual(ids.next_id(), rng)))
            .collect()
    }
}

/// Real vectors drawn uniformly from `[lower, upper)` in every coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformRealInitializer {
    dimension: usize,
    lower: f64,
    upper: f64,
}

impl UniformRealInitializer {
    /// # Errors
    /// Returns an error for a zero dimension or empty bounds.
    pub fn new(dimension: usize, lower: f64, upper: f64) -> Result<Self, ConfigError> {
        if dimension == 0 {
            return Err(ConfigError::InvalidParameter(
                "genome dimension must be greater than 0".into(),
            ));
        }
        if !(lower.is_finite() && upper.is_finite() && lower < upper) {
            return Err(ConfigError::InvalidParameter(format!(
                "initialization bounds must satisfy lower < upper, got [{lower}, {upper}]"
            )));
        }
        Ok(Self {
            dimension,
            lower,
            upper,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl Initializer<RealVector> for UniformRealInitializer {
    fn generate_individual(&self, id: IndividualId, rng: &mut SimRng) -> Individual<RealVector> {
        let genome = (0..self.dimension)
            .map(|_| rng.random_range(self.lower..self.upper))
            .collect();
        Individual::new(id, genome)
    }
}
