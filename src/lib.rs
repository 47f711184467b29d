//! # bundle-reorg
//!
//! Dependency-ordered reorganization of record bundles for transactional
//! insert.
//!
//! A bundle is a batch of heterogeneous records (acts, entities,
//! participations, relationships) that reference each other by key. The
//! store enforces referential integrity, so the batch must be inserted in an
//! order where every referenced record already exists. Producers give no
//! ordering guarantee; this crate computes one.
//!
//! ## Core Contract
//!
//! 1. Extract, per record, the keys it depends on (dispatch by record kind)
//! 2. Build a dependency graph restricted to keys present in the batch
//! 3. Sort with Kahn's algorithm, or reject the batch if it holds a cycle
//!
//! ## Architecture
//!
//! ```text
//! batch → ExtractorRegistry → DependencyGraph → topological_order → ordered batch
//!                                                                        ↓
//!                                                    caller's transactional insert
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same batch in the same order → identical output
//! - Records with no dependency between them keep their input order
//! - When only one valid order exists, every input permutation yields it
//!
//! ## Example
//!
//! ```
//! use bundle_reorg::{Act, BundleReorganizer, Entity, Record, RecordKey};
//!
//! let patient = RecordKey::random();
//! let encounter = RecordKey::random();
//! let batch = vec![
//!     Record::new(encounter, Act::new().with_participation(patient, "record_target")),
//!     Record::new(patient, Entity::new()),
//! ];
//!
//! let ordered = BundleReorganizer::default().reorganize_for_insert(&batch)?;
//! assert_eq!(ordered[0].key, Some(patient));
//! assert_eq!(ordered[1].key, Some(encounter));
//! # Ok::<(), bundle_reorg::ReorganizeError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod extract;
pub mod graph;
pub mod sorter;
pub mod reorganizer;
pub mod config;
pub mod error;
pub mod canonical;

// Re-exports
pub use types::{
    Act, ActParticipation, DependencyEdge, Entity, Participation, Record, RecordBody,
    RecordKey, ReferenceKind, Relationship,
};
pub use extract::{ExtractorRegistry, Reference, References};
pub use graph::DependencyGraph;
pub use sorter::{topological_order, SortedOrder};
pub use reorganizer::{Bundle, BundleError, BundleReorganizer, InsertPlan};
pub use config::ReorganizerConfig;
pub use error::ReorganizeError;
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes};
