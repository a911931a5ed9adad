//! Base types shared by every other module.
//!
//! This module provides individual identities, the thread-safe allocator that
//! hands them out, and the comparator that defines what "better" means for a
//! fitness value.

pub mod fitness;
mod ids;

pub use fitness::FitnessComparator;
pub use ids::{IdAllocator, IndividualId};

/// Random number generator used by every stochastic component.
///
/// Xoshiro256++ is fast and seedable; tasks derive their own generator from a
/// seed drawn by the orchestrator so results do not depend on scheduling.
pub type SimRng = rand_xoshiro::Xoshiro256PlusPlus;
