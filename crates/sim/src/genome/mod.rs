//! Individuals and the genomes they carry.
//!
//! The island core never looks inside a genome. Anything that is `Debug`,
//! `Send`, `Sync` and `'static` can be evolved; objectives, initializers and
//! variation operators are the only places that know the concrete type.

mod individual;

pub use individual::Individual;

use std::fmt::Debug;

/// Marker for types that can be used as genomes.
pub trait Genome: Debug + Send + Sync + 'static {}

impl<T: Debug + Send + Sync + 'static> Genome for T {}

/// Real-valued vector genome used by the bundled objectives and operators.
pub type RealVector = Vec<f64>;
