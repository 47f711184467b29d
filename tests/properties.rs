//! Property tests for bundle reorganization.
//!
//! Batches are random DAGs: record `i` may depend only on records `j < i`,
//! then the batch is shuffled so input order says nothing about dependencies.

use std::collections::HashMap;

use bundle_reorg::{
    BundleReorganizer, DependencyGraph, Entity, ExtractorRegistry, Record, RecordKey,
    ReorganizeError,
};
use proptest::prelude::*;
use uuid::Uuid;

fn key(i: usize) -> RecordKey {
    RecordKey::new(Uuid::from_u128(i as u128 + 1))
}

/// Batch in `order` where record `i` depends on every `j` with `deps[i][j]`.
fn batch_from(deps: &[Vec<usize>], order: &[usize]) -> Vec<Record> {
    order
        .iter()
        .map(|&i| {
            let entity = deps[i]
                .iter()
                .fold(Entity::new(), |e, &j| e.with_relationship(key(j), "depends_on"));
            Record::new(key(i), entity)
        })
        .collect()
}

/// Random DAG (as dependency lists) plus a shuffled input order.
fn dag_strategy() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<usize>)> {
    (1usize..40).prop_flat_map(|n| {
        (
            prop::collection::vec(prop::collection::vec(prop::bool::weighted(0.15), n), n),
            Just((0..n).collect::<Vec<usize>>()).prop_shuffle(),
        )
            .prop_map(|(bits, order)| {
                let deps: Vec<Vec<usize>> = bits
                    .iter()
                    .enumerate()
                    .map(|(i, row)| (0..i).filter(|&j| row[j]).collect::<Vec<usize>>())
                    .collect();
                (deps, order)
            })
    })
}

fn shuffled_indices(max: usize) -> impl Strategy<Value = Vec<usize>> {
    (1usize..max).prop_flat_map(|n| Just((0..n).collect::<Vec<usize>>()).prop_shuffle())
}

proptest! {
    #[test]
    fn output_is_a_permutation((deps, order) in dag_strategy()) {
        let batch = batch_from(&deps, &order);
        let ordered = BundleReorganizer::default().reorganize_for_insert(&batch).unwrap();

        prop_assert_eq!(ordered.len(), batch.len());
        let mut seen: Vec<usize> = ordered
            .iter()
            .map(|r| batch.iter().position(|b| std::ptr::eq(b, *r)).unwrap())
            .collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..batch.len()).collect::<Vec<_>>());
    }

    #[test]
    fn every_dependency_comes_first((deps, order) in dag_strategy()) {
        let batch = batch_from(&deps, &order);
        let graph = DependencyGraph::build(&batch, &ExtractorRegistry::with_builtins(), usize::MAX).unwrap();
        let plan = BundleReorganizer::default().plan(&batch).unwrap();

        let position: HashMap<RecordKey, usize> =
            plan.keys().into_iter().enumerate().map(|(p, k)| (k, p)).collect();
        for edge in graph.edges() {
            prop_assert!(position[&edge.dependency] < position[&edge.dependent]);
        }
    }

    #[test]
    fn levels_are_consistent_with_edges((deps, order) in dag_strategy()) {
        let batch = batch_from(&deps, &order);
        let plan = BundleReorganizer::default().plan(&batch).unwrap();

        let level: HashMap<RecordKey, u32> =
            plan.keys().into_iter().zip(plan.levels().iter().copied()).collect();
        for (i, dependencies) in deps.iter().enumerate() {
            let expected = dependencies.iter().map(|&j| level[&key(j)] + 1).max().unwrap_or(0);
            prop_assert_eq!(level[&key(i)], expected);
        }
    }

    #[test]
    fn same_input_same_output((deps, order) in dag_strategy()) {
        let batch = batch_from(&deps, &order);
        let reorganizer = BundleReorganizer::default();

        let first = reorganizer.plan(&batch).unwrap().keys();
        let second = reorganizer.plan(&batch).unwrap().keys();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn independent_records_keep_input_order(order in shuffled_indices(60)) {
        let deps: Vec<Vec<usize>> = vec![Vec::new(); order.len()];
        let batch = batch_from(&deps, &order);

        let keys = BundleReorganizer::default().plan(&batch).unwrap().keys();
        let expected: Vec<RecordKey> = order.iter().map(|&i| key(i)).collect();
        prop_assert_eq!(keys, expected);
    }

    #[test]
    fn forced_chain_ignores_input_order(order in shuffled_indices(60)) {
        let deps: Vec<Vec<usize>> = (0..order.len())
            .map(|i| if i == 0 { Vec::new() } else { vec![i - 1] })
            .collect();
        let batch = batch_from(&deps, &order);

        let keys = BundleReorganizer::default().plan(&batch).unwrap().keys();
        let expected: Vec<RecordKey> = (0..order.len()).map(key).collect();
        prop_assert_eq!(keys, expected);
    }

    #[test]
    fn ring_is_rejected_with_all_members(ring in 2usize..20, extra in 0usize..10) {
        // 0..ring form a ring; ring..ring+extra are independent.
        let n = ring + extra;
        let deps: Vec<Vec<usize>> = (0..n)
            .map(|i| match i {
                0 => vec![ring - 1],
                i if i < ring => vec![i - 1],
                _ => Vec::new(),
            })
            .collect();
        let order: Vec<usize> = (0..n).rev().collect();
        let batch = batch_from(&deps, &order);

        match BundleReorganizer::default().reorganize_for_insert(&batch) {
            Err(ReorganizeError::CircularDependency { cycle_members, unresolved }) => {
                let expected: Vec<RecordKey> =
                    order.iter().filter(|&&i| i < ring).map(|&i| key(i)).collect();
                prop_assert_eq!(&cycle_members, &expected);
                prop_assert_eq!(&unresolved, &expected);
            }
            other => prop_assert!(false, "expected cycle, got {:?}", other.map(|o| o.len())),
        }
    }
}
