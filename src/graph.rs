//! Dependency graph construction.
//!
//! Nodes are batch positions; the record arena is the batch slice itself and
//! is never copied. Edges run from dependency to dependent and only exist when
//! both endpoints are in the batch. References to keys outside the batch are
//! counted and dropped, since those records are already durable.
//!
//! ## Invariants
//!
//! - One node per record (`node_count() == batch.len()`)
//! - No self-edges and no parallel edges
//! - Adjacency lists are filled in batch order of the dependent

use std::collections::HashMap;

use crate::error::ReorganizeError;
use crate::extract::ExtractorRegistry;
use crate::types::{DependencyEdge, Record, RecordKey, ReferenceKind};

/// Dependency graph over one batch.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Key of each node, by batch position.
    keys: Vec<RecordKey>,
    /// Key -> batch position.
    index: HashMap<RecordKey, usize>,
    /// Dependency -> (dependent, reference kind).
    dependents: Vec<Vec<(usize, ReferenceKind)>>,
    /// Dependent -> dependencies.
    dependencies: Vec<Vec<usize>>,
    edge_count: usize,
    external_references: usize,
}

impl DependencyGraph {
    /// Build the graph for `batch`.
    ///
    /// ## Errors
    ///
    /// - `MissingKey` if a record has no usable key
    /// - `DuplicateKey` if two records share a key
    /// - `TooManyEdges` if more than `max_edges` in-batch edges are found
    pub fn build(
        batch: &[Record],
        registry: &ExtractorRegistry,
        max_edges: usize,
    ) -> Result<Self, ReorganizeError> {
        let mut keys = Vec::with_capacity(batch.len());
        let mut index = HashMap::with_capacity(batch.len());

        for (position, record) in batch.iter().enumerate() {
            let key = record
                .usable_key()
                .ok_or(ReorganizeError::MissingKey { position })?;
            if let Some(&first) = index.get(&key) {
                return Err(ReorganizeError::DuplicateKey {
                    key,
                    first,
                    second: position,
                });
            }
            index.insert(key, position);
            keys.push(key);
        }

        let mut graph = Self {
            dependents: vec![Vec::new(); keys.len()],
            dependencies: vec![Vec::new(); keys.len()],
            keys,
            index,
            edge_count: 0,
            external_references: 0,
        };

        for (position, record) in batch.iter().enumerate() {
            for reference in registry.extract(record) {
                let Some(&dependency) = graph.index.get(&reference.key) else {
                    graph.external_references += 1;
                    continue;
                };
                graph.dependents[dependency].push((position, reference.kind));
                graph.dependencies[position].push(dependency);
                graph.edge_count += 1;

                if graph.edge_count > max_edges {
                    return Err(ReorganizeError::TooManyEdges {
                        count: graph.edge_count,
                        max: max_edges,
                    });
                }
            }
        }

        Ok(graph)
    }

    /// Number of nodes (equals the batch length).
    pub fn node_count(&self) -> usize {
        self.keys.len()
    }

    /// Number of in-batch dependency edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// References dropped because they point outside the batch.
    pub fn external_references(&self) -> usize {
        self.external_references
    }

    /// Key of the node at `position`.
    pub fn key_at(&self, position: usize) -> Option<RecordKey> {
        self.keys.get(position).copied()
    }

    /// Batch position of `key`.
    pub fn position_of(&self, key: &RecordKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Number of in-batch dependencies of `key`.
    pub fn in_degree(&self, key: &RecordKey) -> Option<usize> {
        self.position_of(key).map(|p| self.dependencies[p].len())
    }

    /// In-batch records `key` depends on, in extraction order.
    pub fn dependencies_of(&self, key: &RecordKey) -> Vec<RecordKey> {
        self.position_of(key)
            .map(|p| self.dependencies[p].iter().map(|&d| self.keys[d]).collect())
            .unwrap_or_default()
    }

    /// In-batch records that depend on `key`, in batch order.
    pub fn dependents_of(&self, key: &RecordKey) -> Vec<RecordKey> {
        self.position_of(key)
            .map(|p| self.dependents[p].iter().map(|&(d, _)| self.keys[d]).collect())
            .unwrap_or_default()
    }

    /// All edges, sorted canonically.
    pub fn edges(&self) -> Vec<DependencyEdge> {
        let mut edges: Vec<DependencyEdge> = self
            .dependents
            .iter()
            .enumerate()
            .flat_map(|(dependency, out)| {
                out.iter().map(move |&(dependent, kind)| {
                    DependencyEdge::new(self.keys[dependency], self.keys[dependent], kind)
                })
            })
            .collect();
        edges.sort();
        edges
    }

    pub(crate) fn keys(&self) -> &[RecordKey] {
        &self.keys
    }

    pub(crate) fn dependent_positions(&self, position: usize) -> &[(usize, ReferenceKind)] {
        &self.dependents[position]
    }

    pub(crate) fn in_degrees(&self) -> Vec<usize> {
        self.dependencies.iter().map(Vec::len).collect()
    }
}
