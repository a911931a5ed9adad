//! Per-island configuration.
//!
//! Every island carries its own evaluator, comparator, initializer and
//! ordered list of variation operators. Configurations are created once by an
//! [`IslandGenerator`] before a run starts and are never mutated afterwards.

use crate::base::FitnessComparator;
use crate::errors::{ConfigError, OperatorError};
use crate::evolution::{Evaluator, Operator, OperatorContext};
use crate::genome::{Genome, Individual};
use crate::simulation::Initializer;
use std::fmt;
use std::sync::Arc;

/// Immutable bundle describing how one island evolves.
pub struct IslandConfiguration<G> {
    island: usize,
    evaluator: Evaluator<G>,
    comparator: FitnessComparator,
    initializer: Arc<dyn Initializer<G>>,
    operators: Vec<Arc<dyn Operator<G>>>,
    dynamic: bool,
}

impl<G> Clone for IslandConfiguration<G> {
    fn clone(&self) -> Self {
        Self {
            island: self.island,
            evaluator: self.evaluator.clone(),
            comparator: self.comparator,
            initializer: Arc::clone(&self.initializer),
            operators: self.operators.clone(),
            dynamic: self.dynamic,
        }
    }
}

impl<G: Genome> fmt::Debug for IslandConfiguration<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operators: Vec<&str> = self.operators.iter().map(|op| op.name()).collect();
        f.debug_struct("IslandConfiguration")
            .field("island", &self.island)
            .field("evaluator", &self.evaluator)
            .field("comparator", &self.comparator)
            .field("initializer", &self.initializer)
            .field("operators", &operators)
            .field("dynamic", &self.dynamic)
            .finish()
    }
}

impl<G: Genome> IslandConfiguration<G> {
    /// Island with no variation operators.
    ///
    /// The comparator defaults to [`FitnessComparator::Maximize`] and the
    /// dynamic flag follows the evaluator.
    pub fn new(
        island: usize,
        evaluator: Evaluator<G>,
        initializer: Arc<dyn Initializer<G>>,
    ) -> Self {
        let dynamic = evaluator.is_dynamic();
        Self {
            island,
            evaluator,
            comparator: FitnessComparator::default(),
            initializer,
            operators: Vec::new(),
            dynamic,
        }
    }

    pub fn with_comparator(mut self, comparator: FitnessComparator) -> Self {
        self.comparator = comparator;
        self
    }

    /// Append an operator to the end of the pipeline.
    pub fn with_operator(mut self, operator: Arc<dyn Operator<G>>) -> Self {
        self.operators.push(operator);
        self
    }

    pub fn with_operators(mut self, operators: Vec<Arc<dyn Operator<G>>>) -> Self {
        self.operators = operators;
        self
    }

    /// Force the dynamic-objective flag.
    pub fn with_dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    pub fn island(&self) -> usize {
        self.island
    }

    pub fn evaluator(&self) -> &Evaluator<G> {
        &self.evaluator
    }

    pub fn comparator(&self) -> FitnessComparator {
        self.comparator
    }

    pub fn initializer(&self) -> &Arc<dyn Initializer<G>> {
        &self.initializer
    }

    pub fn operators(&self) -> &[Arc<dyn Operator<G>>] {
        &self.operators
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Run one generation of this island on `individuals`.
    ///
    /// Operators are applied in order. A dynamic objective is then advanced
    /// and the whole subpopulation re-evaluated against the new landscape;
    /// otherwise only individuals without a fitness are evaluated.
    pub fn step(
        &self,
        individuals: Vec<Arc<Individual<G>>>,
        ctx: &mut OperatorContext<'_>,
    ) -> Result<Vec<Arc<Individual<G>>>, OperatorError> {
        let varied = self
            .operators
            .iter()
            .try_fold(individuals, |current, op| op.apply(current, ctx))?;
        if self.dynamic {
            self.evaluator.advance_step();
        }
        Ok(self.evaluator.evaluate_all(varied, !self.dynamic)?)
    }
}

/// Produces the island configurations of a run.
pub trait IslandGenerator<G> {
    /// Configurations for a topology with `islands` islands.
    ///
    /// The orchestrator rejects the result if it does not hold exactly one
    /// configuration per island.
    fn generate(&self, islands: usize) -> Result<Vec<IslandConfiguration<G>>, ConfigError>;

    /// Whether islands may evaluate the same genome differently.
    fn is_heterogeneous(&self) -> bool;
}

/// A fixed list of possibly different islands.
pub struct ExplicitIslands<G> {
    islands: Vec<IslandConfiguration<G>>,
}

impl<G> ExplicitIslands<G> {
    pub fn new(islands: Vec<IslandConfiguration<G>>) -> Self {
        Self { islands }
    }
}

impl<G> IslandGenerator<G> for ExplicitIslands<G> {
    fn generate(&self, _islands: usize) -> Result<Vec<IslandConfiguration<G>>, ConfigError> {
        Ok(self.islands.clone())
    }

    fn is_heterogeneous(&self) -> bool {
        true
    }
}

type IslandFactory<G> = dyn Fn(usize) -> Result<IslandConfiguration<G>, ConfigError> + Send + Sync;

/// Identical islands built by calling a factory once per island index.
///
/// The factory should create fresh objective instances for every island so
/// that dynamic objectives advance independently.
pub struct UniformIslands<G> {
    factory: Arc<IslandFactory<G>>,
}

impl<G> UniformIslands<G> {
    pub fn new(
        factory: impl Fn(usize) -> Result<IslandConfiguration<G>, ConfigError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            factory: Arc::new(factory),
        }
    }
}

impl<G> IslandGenerator<G> for UniformIslands<G> {
    fn generate(&self, islands: usize) -> Result<Vec<IslandConfiguration<G>>, ConfigError> {
        (0..islands).map(|island| (self.factory)(island)).collect()
    }

    fn is_heterogeneous(&self) -> bool {
        false
    }
}
