//! Error types for bundle reorganization.

use crate::types::RecordKey;

/// Every way a reorganization can fail.
///
/// All variants are terminal for the call: no partial order is ever returned
/// alongside them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReorganizeError {
    /// A record has no usable identity key.
    #[error("Record at position {position} has no usable key")]
    MissingKey {
        /// Batch position of the offending record.
        position: usize,
    },

    /// Two batch entries carry the same key.
    #[error("Duplicate key {key} at positions {first} and {second}")]
    DuplicateKey {
        /// The shared key.
        key: RecordKey,
        /// Position of the first entry with this key.
        first: usize,
        /// Position of the later entry with this key.
        second: usize,
    },

    /// The dependency graph contains a cycle.
    #[error("Circular dependency among {} record(s): {}", .cycle_members.len(), join_keys(.cycle_members))]
    CircularDependency {
        /// Records lying on a cycle, in batch order.
        cycle_members: Vec<RecordKey>,
        /// Every record the sort could not emit, in batch order.
        unresolved: Vec<RecordKey>,
    },

    /// The batch exceeds the configured size limit.
    #[error("Batch size exceeded: {size} > {max}")]
    BatchTooLarge {
        /// Records in the batch.
        size: usize,
        /// Configured limit.
        max: usize,
    },

    /// The dependency graph exceeds the configured edge limit.
    #[error("Edge count exceeded: {count} > {max}")]
    TooManyEdges {
        /// Edges materialized before the limit tripped.
        count: usize,
        /// Configured limit.
        max: usize,
    },
}

impl ReorganizeError {
    /// Whether this error reports a dependency cycle.
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }

    /// Keys the error is about, for diagnostics.
    pub fn offending_keys(&self) -> Vec<RecordKey> {
        match self {
            Self::DuplicateKey { key, .. } => vec![*key],
            Self::CircularDependency { cycle_members, .. } => cycle_members.clone(),
            Self::MissingKey { .. } | Self::BatchTooLarge { .. } | Self::TooManyEdges { .. } => {
                Vec::new()
            }
        }
    }
}

fn join_keys(keys: &[RecordKey]) -> String {
    keys.iter()
        .map(RecordKey::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
