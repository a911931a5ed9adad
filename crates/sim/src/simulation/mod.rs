//! Island-model orchestration.
//!
//! This module provides the multi-island population, island connectivity,
//! per-island configuration, migration, stopping conditions and the
//! orchestrator that ties them together.
//!
//! - `CircleOfLife`: the island orchestrator that steps islands concurrently,
//!   migrates between them and tracks the best individual of every island.
//! - `Population`: the shared, lock-guarded set of subpopulations.
//! - `CircleOfLifeBuilder`: fluent builder with fail-fast validation.
//! - `RunConfig`: serializable description of a run.

pub mod builder;
pub mod configs;
pub mod engine;
pub mod initialization;
pub mod island;
pub mod migration;
pub mod population;
pub mod stopping;
pub mod topology;

pub use builder::CircleOfLifeBuilder;
pub use configs::{
    ExecutionConfig, IslandSpec, MetricsConfig, MigrationConfig, MigrationKind, ObjectiveKind,
    RunConfig, StoppingConfig, TopologyConfig,
};
pub use engine::{CircleOfLife, EvolutionResult};
pub use initialization::{Initializer, UniformRealInitializer};
pub use island::{ExplicitIslands, IslandConfiguration, IslandGenerator, UniformIslands};
pub use migration::{
    MigrationContext, MigrationCore, MigrationEvent, MigrationPolicy, MigrationStats,
    NeighborMigration, Outcome, RandomInjection,
};
pub use population::{Population, Subpopulations};
pub use stopping::{FixedSteps, NoImprovement, StoppingCondition};
pub use topology::{FullyConnectedTopology, RingTopology, Topology};
