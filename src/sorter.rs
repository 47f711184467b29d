//! Kahn's topological sort over a [`DependencyGraph`].
//!
//! O(V + E) time and space. Ties are broken by arrival order: the ready queue
//! is seeded in batch order and nodes released by the same predecessor join
//! the back of the queue in batch order. The output is therefore a pure
//! function of the input sequence.
//!
//! If the queue drains before every node is emitted, the remainder contains at
//! least one cycle. The sort then fails; it never emits a partial order.

use std::collections::VecDeque;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::ReorganizeError;
use crate::graph::DependencyGraph;

/// Result of a successful sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedOrder {
    /// Batch positions in insert order.
    pub positions: Vec<usize>,
    /// Insert level of each entry of `positions`.
    ///
    /// Level 0 has no in-batch dependency; otherwise one more than the
    /// deepest dependency. Records on the same level are independent.
    pub levels: Vec<u32>,
}

impl SortedOrder {
    /// Number of distinct levels.
    pub fn depth(&self) -> u32 {
        self.levels.iter().max().map_or(0, |l| l + 1)
    }
}

/// Sort `graph` so every dependency precedes its dependents.
///
/// ## Errors
///
/// `CircularDependency` naming the records on a cycle and every record left
/// unresolved because of it.
pub fn topological_order(graph: &DependencyGraph) -> Result<SortedOrder, ReorganizeError> {
    let node_count = graph.node_count();
    let mut in_degree = graph.in_degrees();
    let mut level = vec![0u32; node_count];

    let mut queue: VecDeque<usize> = (0..node_count).filter(|&p| in_degree[p] == 0).collect();
    let mut positions = Vec::with_capacity(node_count);

    while let Some(node) = queue.pop_front() {
        positions.push(node);
        for &(dependent, _) in graph.dependent_positions(node) {
            level[dependent] = level[dependent].max(level[node] + 1);
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                queue.push_back(dependent);
            }
        }
    }

    if positions.len() < node_count {
        let unresolved: Vec<bool> = in_degree.iter().map(|&d| d > 0).collect();
        let on_cycle = cycle_members(graph, &unresolved);
        let keys = graph.keys();

        return Err(ReorganizeError::CircularDependency {
            cycle_members: (0..node_count).filter(|&p| on_cycle[p]).map(|p| keys[p]).collect(),
            unresolved: (0..node_count).filter(|&p| unresolved[p]).map(|p| keys[p]).collect(),
        });
    }

    let levels = positions.iter().map(|&p| level[p]).collect();
    Ok(SortedOrder { positions, levels })
}

/// Mark nodes of the unresolved subgraph that lie on a cycle.
///
/// Every strongly connected component of the remainder with more than one
/// node is a cycle (the graph has no self-edges).
fn cycle_members(graph: &DependencyGraph, unresolved: &[bool]) -> Vec<bool> {
    let node_count = graph.node_count();
    let mut remainder: DiGraph<usize, ()> = DiGraph::new();
    let mut node_of: Vec<Option<NodeIndex>> = vec![None; node_count];

    for position in (0..node_count).filter(|&p| unresolved[p]) {
        node_of[position] = Some(remainder.add_node(position));
    }
    for position in 0..node_count {
        let Some(from) = node_of[position] else {
            continue;
        };
        for &(dependent, _) in graph.dependent_positions(position) {
            if let Some(to) = node_of[dependent] {
                remainder.add_edge(from, to, ());
            }
        }
    }

    let mut on_cycle = vec![false; node_count];
    for component in tarjan_scc(&remainder) {
        if component.len() > 1 {
            for node in component {
                on_cycle[remainder[node]] = true;
            }
        }
    }
    on_cycle
}
