//! Islevo: island-model evolutionary search.
//!
//! Several subpopulations ("islands") evolve side by side, each with its own
//! evaluator and variation operators, while a migration policy periodically
//! moves individuals between them along a topology. This crate re-exports the
//! core library so applications can depend on a single package.
//!
//! ```
//! use islevo::simulation::RunConfig;
//!
//! let mut config = RunConfig::default();
//! config.execution.subpopulation_size = 10;
//! config.stopping = islevo::simulation::StoppingConfig::FixedSteps { steps: 5 };
//!
//! let result = config.build().unwrap().evolve(0).unwrap();
//! assert_eq!(result.generations, 5);
//! assert_eq!(result.num_islands(), 4);
//! ```

pub use islevo_sim::{base, errors, evolution, genome, prelude, simulation, storage};
pub use islevo_sim::{FitnessComparator, Individual, IndividualId, RealVector};
