//! Objective functions and evaluators.
//!
//! An objective function maps a genome to a fitness value. The island core
//! treats objectives opaquely: it only needs `evaluate(individual) -> fitness`.
//! Objectives may be *dynamic*, meaning their landscape changes over time; the
//! island that owns a dynamic objective advances its step counter once per
//! generation.
//!
//! ## Bundled objectives (real vectors, minimisation)
//! - **Sphere**: `Σ xᵢ²`, optimum 0 at the origin.
//! - **Rastrigin**: `10n + Σ (xᵢ² − 10 cos 2πxᵢ)`, highly multimodal, optimum 0
//!   at the origin.
//! - **ShiftedSphere**: sphere whose optimum sits at `shift + drift · step` in
//!   every coordinate. With a non-zero drift it is dynamic.

use crate::errors::{ConfigError, ObjectiveError};
use crate::genome::{Genome, Individual, RealVector};
use std::f64::consts::PI;
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A fitness function over genomes of type `G`.
///
/// Implementations must be thread-safe: the same objective may be called from
/// the island's stepping task and from migration tasks that re-evaluate
/// immigrants.
pub trait ObjectiveFunction<G>: Send + Sync + Debug {
    /// Short name used in logs and configuration.
    fn name(&self) -> &str;

    /// Calculate the fitness of a genome.
    fn fitness(&self, genome: &G) -> Result<f64, ObjectiveError>;

    /// Whether the landscape changes as the step counter advances.
    fn is_dynamic(&self) -> bool {
        false
    }

    /// Notify the objective that one generation has elapsed.
    fn advance_step(&self) {}

    /// Restore the step counter to its initial state at the start of a run.
    fn reset(&self) {}
}

/// Sphere function: `Σ xᵢ²`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sphere;

impl ObjectiveFunction<RealVector> for Sphere {
    fn name(&self) -> &str {
        "sphere"
    }

    fn fitness(&self, genome: &RealVector) -> Result<f64, ObjectiveError> {
        Ok(genome.iter().map(|x| x * x).sum())
    }
}

/// Rastrigin function: `10n + Σ (xᵢ² − 10 cos 2πxᵢ)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rastrigin;

impl ObjectiveFunction<RealVector> for Rastrigin {
    fn name(&self) -> &str {
        "rastrigin"
    }

    fn fitness(&self, genome: &RealVector) -> Result<f64, ObjectiveError> {
        let n = genome.len() as f64;
        Ok(10.0 * n
            + genome
                .iter()
                .map(|x| x * x - 10.0 * (2.0 * PI * x).cos())
                .sum::<f64>())
    }
}

/// Sphere with a moving optimum at `shift + drift · step` in every coordinate.
#[derive(Debug, Default)]
pub struct ShiftedSphere {
    shift: f64,
    drift: f64,
    step: AtomicUsize,
}

impl ShiftedSphere {
    /// Create a shifted sphere. A `drift` of 0.0 gives a static objective.
    pub fn new(shift: f64, drift: f64) -> Self {
        Self {
            shift,
            drift,
            step: AtomicUsize::new(0),
        }
    }

    /// Current step counter.
    pub fn step(&self) -> usize {
        self.step.load(Ordering::Relaxed)
    }

    /// Location of the optimum in every coordinate at the current step.
    pub fn optimum(&self) -> f64 {
        self.shift + self.drift * self.step() as f64
    }
}

impl ObjectiveFunction<RealVector> for ShiftedSphere {
    fn name(&self) -> &str {
        "shifted_sphere"
    }

    fn fitness(&self, genome: &RealVector) -> Result<f64, ObjectiveError> {
        let center = self.optimum();
        Ok(genome.iter().map(|x| (x - center) * (x - center)).sum())
    }

    fn is_dynamic(&self) -> bool {
        self.drift != 0.0
    }

    fn advance_step(&self) {
        self.step.fetch_add(1, Ordering::Relaxed);
    }

    fn reset(&self) {
        self.step.store(0, Ordering::Relaxed);
    }
}

/// Assigns fitness to individuals.
///
/// An evaluator combines one or more objectives as a weighted sum. It is the
/// capability an island configuration exposes to the orchestrator and to
/// migration policies.
pub struct Evaluator<G> {
    objectives: Vec<(Arc<dyn ObjectiveFunction<G>>, f64)>,
}

impl<G> Clone for Evaluator<G> {
    fn clone(&self) -> Self {
        Self {
            objectives: self.objectives.clone(),
        }
    }
}

impl<G> Debug for Evaluator<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<(&str, f64)> = self
            .objectives
            .iter()
            .map(|(objective, weight)| (objective.name(), *weight))
            .collect();
        f.debug_struct("Evaluator").field("objectives", &names).finish()
    }
}

impl<G: Genome> Evaluator<G> {
    /// Evaluator backed by a single objective with weight 1.0.
    pub fn new(objective: Arc<dyn ObjectiveFunction<G>>) -> Self {
        Self {
            objectives: vec![(objective, 1.0)],
        }
    }

    /// Evaluator computing a weighted sum of objectives.
    ///
    /// # Errors
    /// Returns an error if the list is empty or a weight is not finite.
    pub fn weighted(objectives: Vec<(Arc<dyn ObjectiveFunction<G>>, f64)>) -> Result<Self, ConfigError> {
        if objectives.is_empty() {
            return Err(ConfigError::InvalidParameter(
                "evaluator requires at least one objective".into(),
            ));
        }
        if let Some((objective, weight)) = objectives.iter().find(|(_, w)| !w.is_finite()) {
            return Err(ConfigError::InvalidParameter(format!(
                "weight for objective '{}' must be finite, got {weight}",
                objective.name()
            )));
        }
        Ok(Self { objectives })
    }

    /// Fitness of a genome.
    pub fn fitness(&self, genome: &G) -> Result<f64, ObjectiveError> {
        self.objectives
            .iter()
            .try_fold(0.0, |acc, (objective, weight)| {
                Ok(acc + weight * objective.fitness(genome)?)
            })
    }

    /// Return a copy of `individual` carrying its fitness under this evaluator.
    pub fn evaluate(&self, individual: &Individual<G>) -> Result<Individual<G>, ObjectiveError> {
        Ok(individual.with_fitness(self.fitness(individual.genome())?))
    }

    /// Evaluate a subpopulation.
    ///
    /// With `only_missing` set, individuals that already carry a fitness are
    /// kept as they are.
    pub fn evaluate_all(
        &self,
        individuals: Vec<Arc<Individual<G>>>,
        only_missing: bool,
    ) -> Result<Vec<Arc<Individual<G>>>, ObjectiveError> {
        individuals
            .into_iter()
            .map(|ind| {
                if only_missing && ind.is_evaluated() {
                    Ok(ind)
                } else {
                    self.evaluate(&ind).map(Arc::new)
                }
            })
            .collect()
    }

    /// Whether any objective is dynamic.
    pub fn is_dynamic(&self) -> bool {
        self.objectives.iter().any(|(objective, _)| objective.is_dynamic())
    }

    /// Advance every dynamic objective by one step.
    pub fn advance_step(&self) {
        for (objective, _) in &self.objectives {
            if objective.is_dynamic() {
                objective.advance_step();
            }
        }
    }

    /// Reset every objective's step counter.
    pub fn reset(&self) {
        for (objective, _) in &self.objectives {
            objective.reset();
        }
    }

    /// Names of the objectives, in order.
    pub fn objective_names(&self) -> Vec<&str> {
        self.objectives.iter().map(|(objective, _)| objective.name()).collect()
    }
}
