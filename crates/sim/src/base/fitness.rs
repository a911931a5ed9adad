//! Ordering of fitness values.
//!
//! Fitness is a plain `f64`. Whether larger or smaller values are preferred is
//! decided by a `FitnessComparator`, which every island carries as part of its
//! configuration. Individuals that have not been evaluated yet always rank
//! below evaluated ones.

use crate::genome::Individual;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// Total order over fitness values.
///
/// `compare(a, b) == Ordering::Greater` means `a` is *better* than `b`,
/// whatever the optimisation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessComparator {
    /// Larger fitness is better.
    #[default]
    Maximize,
    /// Smaller fitness is better.
    Minimize,
}

impl FitnessComparator {
    /// Compare two fitness values. `Greater` means `a` is better.
    #[inline]
    pub fn compare_values(self, a: f64, b: f64) -> Ordering {
        match self {
            Self::Maximize => a.total_cmp(&b),
            Self::Minimize => b.total_cmp(&a),
        }
    }

    /// Compare two optional fitness values; a missing value ranks lowest.
    #[inline]
    pub fn compare_fitness(self, a: Option<f64>, b: Option<f64>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => self.compare_values(a, b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }

    /// Compare two individuals by their cached fitness.
    #[inline]
    pub fn compare<G>(self, a: &Individual<G>, b: &Individual<G>) -> Ordering {
        self.compare_fitness(a.fitness(), b.fitness())
    }

    /// Returns true if `a` is strictly better than `b`.
    #[inline]
    pub fn is_better_value(self, a: f64, b: f64) -> bool {
        self.compare_values(a, b) == Ordering::Greater
    }

    /// Returns true if individual `a` is strictly better than `b`.
    #[inline]
    pub fn is_better<G>(self, a: &Individual<G>, b: &Individual<G>) -> bool {
        self.compare(a, b) == Ordering::Greater
    }

    /// Index of the best individual. Ties keep the earliest index.
    pub fn best_index<G>(self, individuals: &[Arc<Individual<G>>]) -> Option<usize> {
        self.extreme_index(individuals, Ordering::Greater)
    }

    /// Index of the worst individual. Ties keep the earliest index.
    pub fn worst_index<G>(self, individuals: &[Arc<Individual<G>>]) -> Option<usize> {
        self.extreme_index(individuals, Ordering::Less)
    }

    fn extreme_index<G>(self, individuals: &[Arc<Individual<G>>], wanted: Ordering) -> Option<usize> {
        let mut iter = individuals.iter().enumerate();
        let (mut best_idx, mut best) = iter.next()?;
        for (idx, ind) in iter {
            if self.compare(ind, best) == wanted {
                best_idx = idx;
                best = ind;
            }
        }
        Some(best_idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::IndividualId;

    fn ind(id: u64, fitness: Option<f64>) -> Arc<Individual<Vec<f64>>> {
        let base = Individual::new(IndividualId::new(id), vec![0.0]);
        Arc::new(match fitness {
            Some(f) => base.with_fitness(f),
            None => base,
        })
    }

    #[test]
    fn test_maximize_prefers_larger() {
        let cmp = FitnessComparator::Maximize;
        assert!(cmp.is_better_value(2.0, 1.0));
        assert!(!cmp.is_better_value(1.0, 1.0));
        assert_eq!(cmp.compare_values(1.0, 2.0), Ordering::Less);
    }

    #[test]
    fn test_minimize_prefers_smaller() {
        let cmp = FitnessComparator::Minimize;
        assert!(cmp.is_better_value(1.0, 2.0));
        assert!(!cmp.is_better_value(2.0, 1.0));
    }

    #[test]
    fn test_unevaluated_ranks_lowest() {
        for cmp in [FitnessComparator::Maximize, FitnessComparator::Minimize] {
            assert_eq!(cmp.compare_fitness(Some(-1e9), None), Ordering::Greater);
            assert_eq!(cmp.compare_fitness(None, Some(1e9)), Ordering::Less);
            assert_eq!(cmp.compare_fitness(None, None), Ordering::Equal);
        }
    }

    #[test]
    fn test_best_and_worst_index() {
        let pop = vec![ind(0, Some(3.0)), ind(1, Some(5.0)), ind(2, Some(1.0)), ind(3, Some(5.0))];

        assert_eq!(FitnessComparator::Maximize.best_index(&pop), Some(1));
        assert_eq!(FitnessComparator::Maximize.worst_index(&pop), Some(2));
        assert_eq!(FitnessComparator::Minimize.best_index(&pop), Some(2));
        assert_eq!(FitnessComparator::Minimize.worst_index(&pop), Some(1));
    }

    #[test]
    fn test_best_index_empty() {
        let pop: Vec<Arc<Individual<Vec<f64>>>> = Vec::new();
        assert_eq!(FitnessComparator::Maximize.best_index(&pop), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&FitnessComparator::Minimize).unwrap();
        assert_eq!(json, "\"minimize\"");
    }
}
