//! Extraction rules for the built-in record variants.

use serde_json::Value;

use crate::types::{
    Record, RecordBody, RecordKey, ReferenceKind,
    ACT_KIND, ACT_PARTICIPATION_KIND, ACT_RELATIONSHIP_KIND, ENTITY_KIND,
    ENTITY_RELATIONSHIP_KIND,
};
use super::{ExtractorRegistry, References};

pub(super) fn register_all(registry: &mut ExtractorRegistry) {
    registry
        .register(ACT_KIND, act)
        .register(ENTITY_KIND, entity)
        .register(ACT_PARTICIPATION_KIND, act_participation)
        .register(ACT_RELATIONSHIP_KIND, standalone_relationship)
        .register(ENTITY_RELATIONSHIP_KIND, standalone_relationship);
}

fn act(record: &Record, refs: &mut References) {
    let RecordBody::Act(act) = &record.body else {
        return;
    };
    for relationship in &act.relationships {
        refs.relationship(relationship.target);
    }
    for participation in &act.participations {
        refs.participation(participation.player);
    }
    if let Some(container) = act.part_of {
        refs.container(container);
    }
}

fn entity(record: &Record, refs: &mut References) {
    let RecordBody::Entity(entity) = &record.body else {
        return;
    };
    for relationship in &entity.relationships {
        refs.relationship(relationship.target);
    }
    if let Some(container) = entity.part_of {
        refs.container(container);
    }
}

fn act_participation(record: &Record, refs: &mut References) {
    let RecordBody::ActParticipation(participation) = &record.body else {
        return;
    };
    refs.container(participation.act);
    refs.participation(participation.player);
}

fn standalone_relationship(record: &Record, refs: &mut References) {
    let (RecordBody::ActRelationship(relationship) | RecordBody::EntityRelationship(relationship)) =
        &record.body
    else {
        return;
    };
    if let Some(source) = relationship.source {
        refs.relationship(source);
    }
    refs.relationship(relationship.target);
}

/// Build a rule for extension records that keep references in attributes.
///
/// Each named attribute may hold a UUID string or an array of them. Values
/// that are absent or not UUIDs are skipped.
///
/// ```
/// use bundle_reorg::{ExtractorRegistry, ReferenceKind};
/// use bundle_reorg::extract::attribute_reference_extractor;
///
/// let mut registry = ExtractorRegistry::with_builtins();
/// registry.register(
///     "care_plan",
///     attribute_reference_extractor(&["patient", "goals"], ReferenceKind::Relationship),
/// );
/// assert!(registry.supports("care_plan"));
/// ```
pub fn attribute_reference_extractor(
    attributes: &[&str],
    kind: ReferenceKind,
) -> impl Fn(&Record, &mut References) + Send + Sync + 'static {
    let attributes: Vec<String> = attributes.iter().map(|a| a.to_string()).collect();
    move |record: &Record, refs: &mut References| {
        for name in &attributes {
            match record.attribute(name) {
                Some(Value::String(raw)) => push_parsed(refs, raw, kind),
                Some(Value::Array(items)) => {
                    for item in items {
                        if let Value::String(raw) = item {
                            push_parsed(refs, raw, kind);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

fn push_parsed(refs: &mut References, raw: &str, kind: ReferenceKind) {
    match RecordKey::parse(raw) {
        Ok(key) => refs.push(key, kind),
        Err(e) => tracing::debug!(value = raw, error = %e, "Skipping non-key attribute value"),
    }
}
