//! Variation operators applied to one island per generation.
//!
//! An island's configuration holds an ordered list of operators. During the
//! stepping phase the island's task threads its subpopulation through every
//! operator in turn; each operator consumes a subpopulation and returns the
//! next one. Operators only ever see their own island.

use crate::base::{FitnessComparator, IdAllocator, SimRng};
use crate::errors::{ConfigError, OperatorError};
use crate::evolution::Selector;
use crate::genome::Individual;
use std::fmt::Debug;
use std::sync::Arc;

/// Task-confined state handed to operators.
pub struct OperatorContext<'a> {
    /// Island being stepped
    pub island: usize,
    /// Current generation
    pub step: usize,
    /// Ordering that defines "better" on this island
    pub comparator: FitnessComparator,
    /// Source of identities for new individuals
    pub ids: &'a IdAllocator,
    /// Random number generator owned by this task
    pub rng: &'a mut SimRng,
}

/// A variation step over one subpopulation.
pub trait Operator<G>: Send + Sync + Debug {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Produce the next subpopulation from `individuals`.
    ///
    /// New individuals may be returned unevaluated; the island evaluates
    /// anything without a fitness once all operators have run.
    fn apply(
        &self,
        individuals: Vec<Arc<Individual<G>>>,
        ctx: &mut OperatorContext<'_>,
    ) -> Result<Vec<Arc<Individual<G>>>, OperatorError>;
}

/// Generational replacement driven by a selector.
///
/// The `elitism` best individuals survive unchanged; the remaining slots are
/// filled by repeated selection (with replacement) from the current
/// subpopulation. The size of the subpopulation is preserved.
#[derive(Debug)]
pub struct SelectionOperator<G> {
    selector: Arc<dyn Selector<G>>,
    elitism: usize,
}

impl<G> SelectionOperator<G> {
    pub fn new(selector: Arc<dyn Selector<G>>, elitism: usize) -> Self {
        Self { selector, elitism }
    }
}

impl<G: Send + Sync + Debug> Operator<G> for SelectionOperator<G> {
    fn name(&self) -> &str {
        "selection"
    }

    fn apply(
        &self,
        individuals: Vec<Arc<Individual<G>>>,
        ctx: &mut OperatorContext<'_>,
    ) -> Result<Vec<Arc<Individual<G>>>, OperatorError> {
        if individuals.is_empty() {
            return Err(OperatorError::EmptyInput);
        }
        let size = individuals.len();
        let elites = self.elitism.min(size);

        let mut ranked: Vec<usize> = (0..size).collect();
        // Stable sort keeps the original order among equals
        ranked.sort_by(|&a, &b| ctx.comparator.compare(&individuals[b], &individuals[a]));

        let mut next = Vec::with_capacity(size);
        next.extend(ranked[..elites].iter().map(|&i| Arc::clone(&individuals[i])));
        while next.len() < size {
            let picked = self
                .selector
                .select_individual(&individuals, ctx.comparator, ctx.rng)
                .ok_or(OperatorError::EmptyInput)?;
            next.push(picked);
        }
        Ok(next)
    }
}

/// Runs a fixed, non-empty sequence of operators as one operator.
#[derive(Debug)]
pub struct Pipeline<G> {
    operators: Vec<Arc<dyn Operator<G>>>,
}

impl<G> Pipeline<G> {
    /// # Errors
    /// Returns an error if `operators` is empty.
    pub fn new(operators: Vec<Arc<dyn Operator<G>>>) -> Result<Self, ConfigError> {
        if operators.is_empty() {
            return Err(ConfigError::InvalidParameter(
                "pipeline requires at least one operator".into(),
            ));
        }
        Ok(Self { operators })
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl<G: Send + Sync + Debug> Operator<G> for Pipeline<G> {
    fn name(&self) -> &str {
        "pipeline"
    }

    fn apply(
        &self,
        individuals: Vec<Arc<Individual<G>>>,
        ctx: &mut OperatorContext<'_>,
    ) -> Result<Vec<Arc<Individual<G>>>, OperatorError> {
        self.operators
            .iter()
            .try_fold(individuals, |current, op| op.apply(current, ctx))
    }
}
