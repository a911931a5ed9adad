//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use islevo_sim::prelude::*;
//!
//! let config = RunConfig::default();
//! let sim = config.build().unwrap();
//! assert_eq!(sim.num_islands(), 4);
//! ```

pub use crate::base::{FitnessComparator, IdAllocator, IndividualId, SimRng};
pub use crate::errors::{ConfigError, EvolutionError, MigrationError, PopulationError};
pub use crate::evolution::{
    Evaluator, GaussianMutation, ObjectiveFunction, Operator, SelectionOperator,
    SelectionStrategy, Selector,
};
pub use crate::genome::{Genome, Individual, RealVector};
pub use crate::simulation::{
    CircleOfLife, CircleOfLifeBuilder, EvolutionResult, ExplicitIslands, FixedSteps,
    FullyConnectedTopology, IslandConfiguration, IslandGenerator, MigrationCore, MigrationPolicy,
    NeighborMigration, NoImprovement, Population, RandomInjection, RingTopology, RunConfig,
    StoppingCondition, Topology, UniformIslands, UniformRealInitializer,
};
