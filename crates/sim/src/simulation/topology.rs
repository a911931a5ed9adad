//! Island connectivity.
//!
//! A topology is an immutable graph over island indices `0..num_islands()`.
//! The orchestrator and migration policies only ask adjacency questions, so
//! any graph can be plugged in.

use crate::errors::ConfigError;
use std::collections::BTreeSet;
use std::fmt::Debug;

/// Connectivity graph over islands.
pub trait Topology: Send + Sync + Debug {
    /// Number of islands in the graph.
    fn num_islands(&self) -> usize;

    /// Whether individuals may move from island `from` to island `to`.
    fn is_connected(&self, from: usize, to: usize) -> bool;

    /// Islands reachable from `island`, in ascending order.
    fn neighbors(&self, island: usize) -> BTreeSet<usize> {
        (0..self.num_islands())
            .filter(|&other| self.is_connected(island, other))
            .collect()
    }
}

fn check_islands(islands: usize) -> Result<(), ConfigError> {
    if islands == 0 {
        return Err(ConfigError::InvalidParameter(
            "topology requires at least one island".into(),
        ));
    }
    Ok(())
}

/// Every pair of distinct islands is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullyConnectedTopology {
    islands: usize,
}

impl FullyConnectedTopology {
    /// # Errors
    /// Returns an error if `islands` is 0.
    pub fn new(islands: usize) -> Result<Self, ConfigError> {
        check_islands(islands)?;
        Ok(Self { islands })
    }
}

impl Topology for FullyConnectedTopology {
    fn num_islands(&self) -> usize {
        self.islands
    }

    fn is_connected(&self, from: usize, to: usize) -> bool {
        from != to && from < self.islands && to < self.islands
    }
}

/// Islands arranged in a bidirectional ring: `i` is connected to `i - 1` and
/// `i + 1` (mod n).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingTopology {
    islands: usize,
}

impl RingTopology {
    /// # Errors
    /// Returns an error if `islands` is 0.
    pub fn new(islands: usize) -> Result<Self, ConfigError> {
        check_islands(islands)?;
        Ok(Self { islands })
    }
}

impl Topology for RingTopology {
    fn num_islands(&self) -> usize {
        self.islands
    }

    fn is_connected(&self, from: usize, to: usize) -> bool {
        let n = self.islands;
        if from == to || from >= n || to >= n {
            return false;
        }
        (from + 1) % n == to || (to + 1) % n == from
    }

    fn neighbors(&self, island: usize) -> BTreeSet<usize> {
        let n = self.islands;
        if island >= n || n == 1 {
            return BTreeSet::new();
        }
        [(island + n - 1) % n, (island + 1) % n].into_iter().collect()
    }
}
