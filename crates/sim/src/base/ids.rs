use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identity of an individual within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndividualId(u64);

impl IndividualId {
    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IndividualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ind_{}", self.0)
    }
}

/// Thread-safe source of fresh `IndividualId`s.
///
/// An allocator is created once per run and passed by reference to every
/// place that constructs individuals (initializers, operators, migration
/// policies). Concurrent island tasks may allocate from the same allocator;
/// every call returns a distinct id.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    /// Create an allocator whose first id is 0.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create an allocator whose first id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Allocate the next id.
    #[inline]
    pub fn next_id(&self) -> IndividualId {
        IndividualId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids handed out so far (relative to 0).
    pub fn allocated(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
