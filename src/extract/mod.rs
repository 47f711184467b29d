//! Reference extraction.
//!
//! Maps one record to the keys it depends on. Extraction is dispatched through
//! an [`ExtractorRegistry`] keyed by the record's kind tag, so new record kinds
//! plug in by registering a rule; the graph builder and sorter never look at
//! record variants.
//!
//! ## Rules
//!
//! 1. A reference to the record's own key is discarded
//! 2. Duplicate references collapse to the first occurrence
//! 3. No references yields an empty set, never an error
//! 4. Kinds without reference-bearing fields (or without a registered rule)
//!    yield an empty set

pub mod builtin;

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::types::{Record, RecordKey, ReferenceKind};

pub use builtin::attribute_reference_extractor;

/// One outbound reference of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Key of the referenced record.
    pub key: RecordKey,
    /// Kind of link that produced the reference.
    pub kind: ReferenceKind,
}

/// Collector handed to extraction rules.
///
/// Applies the self-reference and deduplication rules as references are
/// pushed, preserving first-seen order.
#[derive(Debug)]
pub struct References {
    owner: Option<RecordKey>,
    seen: HashSet<RecordKey>,
    items: Vec<Reference>,
}

impl References {
    fn new(owner: Option<RecordKey>) -> Self {
        Self {
            owner,
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }

    /// Record a dependency on `key`.
    pub fn push(&mut self, key: RecordKey, kind: ReferenceKind) {
        if self.owner == Some(key) {
            return;
        }
        if self.seen.insert(key) {
            self.items.push(Reference { key, kind });
        }
    }

    /// Record the target side of a relationship.
    pub fn relationship(&mut self, key: RecordKey) {
        self.push(key, ReferenceKind::Relationship);
    }

    /// Record a participant.
    pub fn participation(&mut self, key: RecordKey) {
        self.push(key, ReferenceKind::Participation);
    }

    /// Record a containing record.
    pub fn container(&mut self, key: RecordKey) {
        self.push(key, ReferenceKind::Container);
    }

    /// Number of distinct references collected so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn into_vec(self) -> Vec<Reference> {
        self.items
    }
}

/// Extraction rule for one record kind.
pub type Extractor = Box<dyn Fn(&Record, &mut References) + Send + Sync>;

/// Dispatch table from record kind tag to extraction rule.
pub struct ExtractorRegistry {
    extractors: HashMap<String, Extractor>,
}

impl ExtractorRegistry {
    /// Create a registry with no rules.
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Create a registry with rules for every built-in record variant.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        builtin::register_all(&mut registry);
        registry
    }

    /// Register (or replace) the rule for `kind`.
    pub fn register<F>(&mut self, kind: impl Into<String>, extractor: F) -> &mut Self
    where
        F: Fn(&Record, &mut References) + Send + Sync + 'static,
    {
        self.extractors.insert(kind.into(), Box::new(extractor));
        self
    }

    /// Whether a rule is registered for `kind`.
    pub fn supports(&self, kind: &str) -> bool {
        self.extractors.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.extractors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Extract the distinct references of `record`, excluding itself.
    pub fn extract(&self, record: &Record) -> Vec<Reference> {
        let mut references = References::new(record.usable_key());
        match self.extractors.get(record.kind()) {
            Some(extractor) => extractor(record, &mut references),
            None => {
                tracing::warn!(
                    kind = record.kind(),
                    key = ?record.key,
                    "No dependency extractor registered; record treated as having no references"
                );
            }
        }
        references.into_vec()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Act, Entity};
    use serde_json::Map;
    use uuid::Uuid;

    fn key(id: u128) -> RecordKey {
        RecordKey::new(Uuid::from_u128(id))
    }

    fn keys(references: &[Reference]) -> Vec<RecordKey> {
        references.iter().map(|r| r.key).collect()
    }

    #[test]
    fn test_self_reference_discarded() {
        let registry = ExtractorRegistry::with_builtins();
        let record = Record::new(key(1), Act::new().with_relationship(key(1), "replaces"));

        assert!(registry.extract(&record).is_empty());
    }

    #[test]
    fn test_duplicates_collapse_to_first_occurrence() {
        let registry = ExtractorRegistry::with_builtins();
        let record = Record::new(
            key(1),
            Act::new()
                .with_participation(key(2), "author")
                .with_relationship(key(3), "has_component")
                .with_relationship(key(2), "refers_to")
                .with_participation(key(3), "location"),
        );

        let refs = registry.extract(&record);
        assert_eq!(keys(&refs), vec![key(3), key(2)]);
        assert_eq!(refs[0].kind, ReferenceKind::Relationship);
        // Relationships are visited before participations.
        assert_eq!(refs[1].kind, ReferenceKind::Relationship);
    }

    #[test]
    fn test_no_links_is_empty() {
        let registry = ExtractorRegistry::with_builtins();
        assert!(registry.extract(&Record::new(key(1), Entity::new())).is_empty());
    }

    #[test]
    fn test_unregistered_kind_is_empty() {
        let registry = ExtractorRegistry::with_builtins();
        let record = Record::extension(key(1), "unknown_kind", Map::new());

        assert!(!registry.supports("unknown_kind"));
        assert!(registry.extract(&record).is_empty());
    }

    #[test]
    fn test_register_custom_kind() {
        let mut registry = ExtractorRegistry::empty();
        let container = key(9);
        registry.register("bed_assignment", move |_record, refs| refs.container(container));

        let record = Record::extension(key(1), "bed_assignment", Map::new());
        let refs = registry.extract(&record);

        assert_eq!(refs, vec![Reference { key: key(9), kind: ReferenceKind::Container }]);
        assert_eq!(registry.kinds(), vec!["bed_assignment"]);
    }

    #[test]
    fn test_register_replaces_rule() {
        let mut registry = ExtractorRegistry::with_builtins();
        registry.register("entity", |_record, _refs| {});

        let record = Record::new(key(1), Entity::new().with_container(key(2)));
        assert!(registry.extract(&record).is_empty());
    }
}
