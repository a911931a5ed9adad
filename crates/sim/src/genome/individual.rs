use crate::base::IndividualId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A candidate solution.
///
/// `Individual` pairs a genome with a unique identity, an optional fitness
/// value (`None` until it has been evaluated) and the identities of its
/// parents. It is immutable once built: updates such as assigning a fitness
/// return a new value sharing the same genome allocation, so copying an
/// individual between islands never duplicates the genome.
#[derive(Debug, Serialize, Deserialize)]
pub struct Individual<G> {
    /// Unique identifier
    id: IndividualId,
    /// Shared genome
    genome: Arc<G>,
    /// Cached fitness value. `None` indicates the individual has not been
    /// evaluated yet.
    fitness: Option<f64>,
    /// Identities of the individuals this one was derived from
    parents: Vec<IndividualId>,
}

impl<G> Clone for Individual<G> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            genome: Arc::clone(&self.genome),
            fitness: self.fitness,
            parents: self.parents.clone(),
        }
    }
}

impl<G> Individual<G> {
    /// Create a new unevaluated individual without parents.
    pub fn new(id: IndividualId, genome: G) -> Self {
        Self {
            id,
            genome: Arc::new(genome),
            fitness: None,
            parents: Vec::new(),
        }
    }

    /// Create a new unevaluated individual derived from `parents`.
    pub fn offspring(id: IndividualId, genome: G, parents: Vec<IndividualId>) -> Self {
        Self {
            id,
            genome: Arc::new(genome),
            fitness: None,
            parents,
        }
    }

    #[inline]
    pub fn id(&self) -> IndividualId {
        self.id
    }

    #[inline]
    pub fn genome(&self) -> &G {
        &self.genome
    }

    /// Return the cached fitness value, or `None` if not evaluated yet.
    #[inline]
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    #[inline]
    pub fn parents(&self) -> &[IndividualId] {
        &self.parents
    }

    /// Return a copy of this individual carrying `fitness`.
    ///
    /// Identity, genome and parents are preserved.
    pub fn with_fitness(&self, fitness: f64) -> Self {
        Self {
            fitness: Some(fitness),
            ..self.clone()
        }
    }

    /// Return a copy of this individual with its fitness cleared.
    pub fn without_fitness(&self) -> Self {
        Self {
            fitness: None,
            ..self.clone()
        }
    }
}
