//! Stopping conditions.
//!
//! A stopping condition is asked once per generation whether the run should
//! halt. Conditions may keep state across generations (for example a running
//! best), which `reset` clears at the start of every run.

use crate::base::FitnessComparator;
use crate::errors::ConfigError;
use crate::genome::Individual;
use crate::simulation::Population;
use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

/// Halting predicate with resettable per-run state.
pub trait StoppingCondition<G>: Send + Sync + Debug {
    /// Whether to stop after `step` completed generations.
    fn stop(&self, population: &Population<G>, step: usize) -> bool;

    /// Single-individual form used by search variants without islands.
    fn stop_individual(&self, individual: &Individual<G>, step: usize) -> bool;

    /// Clear per-run state.
    fn reset(&self) {}
}

/// Stops once a fixed number of generations has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSteps {
    steps: usize,
}

impl FixedSteps {
    /// # Errors
    /// Returns an error if `steps` is 0.
    pub fn new(steps: usize) -> Result<Self, ConfigError> {
        if steps == 0 {
            return Err(ConfigError::InvalidParameter(
                "step budget must be greater than 0".into(),
            ));
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl<G> StoppingCondition<G> for FixedSteps {
    fn stop(&self, _population: &Population<G>, step: usize) -> bool {
        step >= self.steps
    }

    fn stop_individual(&self, _individual: &Individual<G>, step: usize) -> bool {
        step >= self.steps
    }
}

#[derive(Debug, Default)]
struct ImprovementState {
    best: Option<f64>,
    stale: usize,
}

/// Stops after `window` consecutive generations without a strict improvement
/// of the global best fitness.
#[derive(Debug)]
pub struct NoImprovement {
    window: usize,
    comparator: FitnessComparator,
    state: Mutex<ImprovementState>,
}

impl NoImprovement {
    /// # Errors
    /// Returns an error if `window` is 0.
    pub fn new(window: usize, comparator: FitnessComparator) -> Result<Self, ConfigError> {
        if window == 0 {
            return Err(ConfigError::InvalidParameter(
                "improvement window must be greater than 0".into(),
            ));
        }
        Ok(Self {
            window,
            comparator,
            state: Mutex::new(ImprovementState::default()),
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Fold one observed fitness into the running state.
    fn observe(&self, fitness: Option<f64>) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let improved = match (fitness, state.best) {
            (Some(candidate), Some(best)) => self.comparator.is_better_value(candidate, best),
            (Some(_), None) => true,
            (None, _) => false,
        };
        if improved {
            state.best = fitness;
            state.stale = 0;
        } else {
            state.stale += 1;
        }
        state.stale >= self.window
    }
}

impl<G> StoppingCondition<G> for NoImprovement {
    fn stop(&self, population: &Population<G>, _step: usize) -> bool {
        self.observe(population.get_best(self.comparator).fitness())
    }

    fn stop_individual(&self, individual: &Individual<G>, _step: usize) -> bool {
        self.observe(individual.fitness())
    }

    fn reset(&self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = ImprovementState::default();
    }
}
