//! Bundle reorganization façade.
//!
//! Takes a batch in arbitrary order and returns it in an order that is safe
//! for sequential insertion inside one transaction:
//!
//! ```text
//! batch → ExtractorRegistry (per record) → DependencyGraph → topological_order → ordered batch
//! ```
//!
//! The graph is rebuilt on every call and dropped before returning. Nothing
//! is cached and no record is cloned or mutated.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::config::ReorganizerConfig;
use crate::error::ReorganizeError;
use crate::extract::ExtractorRegistry;
use crate::graph::DependencyGraph;
use crate::sorter::topological_order;
use crate::types::{Record, RecordKey};

/// Orders batches for insert.
///
/// Holds only immutable configuration and the extractor registry, so one
/// instance can be shared across threads.
#[derive(Debug, Default)]
pub struct BundleReorganizer {
    config: ReorganizerConfig,
    registry: ExtractorRegistry,
}

impl BundleReorganizer {
    /// Create a reorganizer with the built-in extractors.
    pub fn new(config: ReorganizerConfig) -> Self {
        Self::with_registry(config, ExtractorRegistry::with_builtins())
    }

    /// Create a reorganizer with a custom extractor registry.
    pub fn with_registry(config: ReorganizerConfig, registry: ExtractorRegistry) -> Self {
        Self { config, registry }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ReorganizerConfig {
        &self.config
    }

    /// Get the extractor registry.
    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    /// Get the extractor registry for registering additional record kinds.
    pub fn registry_mut(&mut self) -> &mut ExtractorRegistry {
        &mut self.registry
    }

    /// Return `batch` reordered so every in-batch dependency comes first.
    ///
    /// The result borrows the input records: same elements, same count.
    pub fn reorganize_for_insert<'a>(
        &self,
        batch: &'a [Record],
    ) -> Result<Vec<&'a Record>, ReorganizeError> {
        Ok(self.plan(batch)?.into_records())
    }

    /// Compute the full insert plan for `batch`.
    pub fn plan<'a>(&self, batch: &'a [Record]) -> Result<InsertPlan<'a>, ReorganizeError> {
        let result = self.plan_inner(batch);
        match &result {
            Ok(plan) => {
                let fingerprint = plan.fingerprint().ok();
                tracing::debug!(
                    records = plan.len(),
                    edges = plan.edge_count,
                    levels = plan.depth(),
                    external_references = plan.external_references,
                    fingerprint = fingerprint.as_deref(),
                    "Bundle reorganized for insert"
                )
            }
            Err(e) => tracing::warn!(
                records = batch.len(),
                error = %e,
                "Bundle reorganization rejected"
            ),
        }
        result
    }

    fn plan_inner<'a>(&self, batch: &'a [Record]) -> Result<InsertPlan<'a>, ReorganizeError> {
        if batch.len() > self.config.max_batch_size {
            return Err(ReorganizeError::BatchTooLarge {
                size: batch.len(),
                max: self.config.max_batch_size,
            });
        }

        let graph = DependencyGraph::build(batch, &self.registry, self.config.max_edges)?;
        let sorted = topological_order(&graph)?;

        Ok(InsertPlan {
            records: sorted.positions.iter().map(|&p| &batch[p]).collect(),
            positions: sorted.positions,
            levels: sorted.levels,
            edge_count: graph.edge_count(),
            external_references: graph.external_references(),
        })
    }
}

/// A batch in insert order, with diagnostics.
#[derive(Debug, Clone)]
pub struct InsertPlan<'a> {
    records: Vec<&'a Record>,
    positions: Vec<usize>,
    levels: Vec<u32>,
    edge_count: usize,
    external_references: usize,
}

impl<'a> InsertPlan<'a> {
    /// Records in insert order.
    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    /// Consume the plan, keeping only the ordered records.
    pub fn into_records(self) -> Vec<&'a Record> {
        self.records
    }

    /// Original batch position of each record, in insert order.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Insert level of each record, in insert order.
    pub fn levels(&self) -> &[u32] {
        &self.levels
    }

    /// Number of distinct insert levels.
    pub fn depth(&self) -> u32 {
        self.levels.iter().max().map_or(0, |l| l + 1)
    }

    /// Keys in insert order.
    pub fn keys(&self) -> Vec<RecordKey> {
        self.records.iter().filter_map(|r| r.usable_key()).collect()
    }

    /// In-batch dependency edges honoured by the plan.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// References to records outside the batch.
    pub fn external_references(&self) -> usize {
        self.external_references
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the plan is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Canonical hash of the key sequence.
    ///
    /// Two plans with the same fingerprint insert the same records in the
    /// same order.
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        canonical_hash_hex(&self.keys())
    }
}

/// Owned batch of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    /// Records, in submission order until reorganized.
    pub items: Vec<Record>,
}

/// Reorganization failure that hands the bundle back untouched.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct BundleError {
    /// The bundle as submitted.
    pub bundle: Bundle,
    /// Why it could not be ordered.
    #[source]
    pub source: ReorganizeError,
}

impl Bundle {
    /// Create a bundle.
    pub fn new(items: Vec<Record>) -> Self {
        Self { items }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the bundle is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Move the records into insert order.
    ///
    /// Records are moved, never cloned. On failure the bundle comes back in
    /// its original order inside the error.
    pub fn into_insert_order(self, reorganizer: &BundleReorganizer) -> Result<Bundle, BundleError> {
        let planned = reorganizer.plan(&self.items).map(|plan| plan.positions);
        let positions = match planned {
            Ok(positions) => positions,
            Err(source) => return Err(BundleError { bundle: self, source }),
        };

        let mut slots: Vec<Option<Record>> = self.items.into_iter().map(Some).collect();
        let items = positions
            .into_iter()
            .filter_map(|p| slots[p].take())
            .collect();
        Ok(Bundle { items })
    }
}
