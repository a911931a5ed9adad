//! Evolution module providing the building blocks an island runs each
//! generation.
//!
//! - **Objectives**: fitness functions and the `Evaluator` that applies them
//! - **Selection**: strategies for picking individuals out of a subpopulation
//! - **Operators**: per-island variation steps (selection, pipelines)
//! - **Mutation**: Gaussian mutation of real-valued genomes

pub mod mutation;
pub mod objective;
pub mod operators;
pub mod selection;

pub use mutation::GaussianMutation;
pub use objective::{Evaluator, ObjectiveFunction, Rastrigin, ShiftedSphere, Sphere};
pub use operators::{Operator, OperatorContext, Pipeline, SelectionOperator};
pub use selection::{
    BestSelector, RandomSelector, SelectionStrategy, Selector, TournamentSelector, WorstSelector,
};
