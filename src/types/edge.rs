//! Dependency edge types.

use serde::{Deserialize, Serialize};
use super::key::RecordKey;

/// Why one record depends on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Target side of a relationship link.
    Relationship,
    /// Participant named by a participation link.
    Participation,
    /// Container the record is part of.
    Container,
}

impl std::str::FromStr for ReferenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relationship" => Ok(Self::Relationship),
            "participation" => Ok(Self::Participation),
            "container" => Ok(Self::Container),
            other => Err(format!("unknown reference kind: {}", other)),
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relationship => write!(f, "relationship"),
            Self::Participation => write!(f, "participation"),
            Self::Container => write!(f, "container"),
        }
    }
}

/// Edge in the dependency graph.
///
/// `dependency` must be persisted before `dependent`.
/// Implements `Ord` for deterministic listing: (dependency, dependent, kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Record that must be persisted first.
    pub dependency: RecordKey,
    /// Record that references `dependency`.
    pub dependent: RecordKey,
    /// Kind of the reference that produced the edge.
    pub kind: ReferenceKind,
}

impl DependencyEdge {
    /// Create a new edge.
    pub fn new(dependency: RecordKey, dependent: RecordKey, kind: ReferenceKind) -> Self {
        Self {
            dependency,
            dependent,
            kind,
        }
    }
}

impl PartialOrd for DependencyEdge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DependencyEdge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.dependency
            .cmp(&other.dependency)
            .then_with(|| self.dependent.cmp(&other.dependent))
            .then_with(|| self.kind.cmp(&other.kind))
    }
}
