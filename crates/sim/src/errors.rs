use thiserror::Error;

/// Errors raised when a `Population` is read or mutated with arguments that
/// violate its contract.
///
/// These are contract violations rather than recoverable runtime conditions:
/// the offending mutation is rejected and the population is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PopulationError {
    /// The island index does not address an existing subpopulation.
    #[error("Island index {island} out of bounds (islands = {len})")]
    IslandOutOfBounds { island: usize, len: usize },

    /// The slot index does not address an existing individual.
    #[error("Slot {slot} out of bounds for island {island} (size = {len})")]
    SlotOutOfBounds {
        island: usize,
        slot: usize,
        len: usize,
    },

    /// A subpopulation would become empty.
    #[error("Subpopulation for island {0} must not be empty")]
    EmptySubpopulation(usize),

    /// A population was constructed without any subpopulation.
    #[error("Population must contain at least one subpopulation")]
    NoSubpopulations,
}

/// Errors detected while assembling an orchestrator or one of its parts.
///
/// Construction fails fast: no partially-built component is ever returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A required parameter was never provided.
    #[error("Missing required parameter: {0}")]
    MissingRequired(&'static str),

    /// A parameter was provided with a value outside its valid range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The island generator and the topology disagree on the island count.
    #[error(
        "Island generator produced {actual} configurations but the topology has {expected} islands"
    )]
    IslandCountMismatch { expected: usize, actual: usize },

    /// An island configuration names an island the topology does not have.
    #[error("Island identity {island} is out of range for {len} islands")]
    IslandOutOfRange { island: usize, len: usize },

    /// Two island configurations claim the same identity.
    #[error("Island identity {0} appears more than once")]
    DuplicateIsland(usize),
}

/// Errors produced by objective functions while assigning fitness.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObjectiveError {
    /// The genome does not have the dimension the objective expects.
    #[error("Genome dimension {actual} does not match objective dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Any other evaluation failure.
    #[error("Fitness evaluation failed: {0}")]
    Evaluation(String),
}

/// Errors produced by variation operators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperatorError {
    /// The operator was handed an empty subpopulation.
    #[error("Operator received an empty subpopulation")]
    EmptyInput,

    /// Re-evaluation inside an operator failed.
    #[error(transparent)]
    Objective(#[from] ObjectiveError),

    /// Any other operator failure.
    #[error("Operator failed: {0}")]
    Failed(String),
}

/// Errors surfaced by a migration policy.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Population(#[from] PopulationError),

    #[error(transparent)]
    Objective(#[from] ObjectiveError),

    /// A migration event addressed an island the topology does not have.
    #[error("Migration event targets island {island} but only {len} islands exist")]
    UnknownIsland { island: usize, len: usize },
}

/// Top-level error returned by the island orchestrator.
///
/// Any of these aborts the current run; no `EvolutionResult` is produced.
#[derive(Debug, Error)]
pub enum EvolutionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Population(#[from] PopulationError),

    #[error(transparent)]
    Objective(#[from] ObjectiveError),

    #[error(transparent)]
    Operator(#[from] OperatorError),

    #[error("Migration failed at generation {step}: {source}")]
    Migration {
        step: usize,
        #[source]
        source: MigrationError,
    },

    /// A stepping task failed; the failure is observed at the stepping barrier.
    #[error("Island {island} failed at generation {step}: {source}")]
    IslandTask {
        island: usize,
        step: usize,
        #[source]
        source: Box<EvolutionError>,
    },

    /// A worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_error_messages() {
        let err = PopulationError::SlotOutOfBounds {
            island: 1,
            slot: 7,
            len: 5,
        };
        assert_eq!(err.to_string(), "Slot 7 out of bounds for island 1 (size = 5)");
        assert_eq!(
            PopulationError::EmptySubpopulation(2).to_string(),
            "Subpopulation for island 2 must not be empty"
        );
    }

    #[test]
    fn test_island_task_error_keeps_source() {
        let inner = EvolutionError::Operator(OperatorError::EmptyInput);
        let err = EvolutionError::IslandTask {
            island: 3,
            step: 4,
            source: Box::new(inner),
        };
        let message = err.to_string();
        assert!(message.contains("Island 3"));
        assert!(message.contains("generation 4"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_config_error_mismatch_message() {
        let err = ConfigError::IslandCountMismatch {
            expected: 3,
            actual: 2,
        };
        assert!(err.to_string().contains("2 configurations"));
        assert!(err.to_string().contains("3 islands"));
    }
}
