//! # Simulation Crate
//!
//! The `sim` crate provides the island-model evolutionary loop.
//! It includes modules for individuals and their genomes, the shared
//! population, topologies, migration policies, stopping conditions,
//! and the orchestrator that ties them together.

pub mod base;
pub mod errors;
pub mod evolution;
pub mod genome;
pub mod prelude;
pub mod simulation;
pub mod storage;

pub use base::{FitnessComparator, IndividualId};
pub use genome::{Individual, RealVector};
