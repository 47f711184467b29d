//! Record model for bundles.
//!
//! A [`Record`] is a key plus a [`RecordBody`], a tagged union of the record
//! variants the crate knows about. Kinds defined elsewhere travel as
//! [`RecordBody::Extension`] and get their dependency rules from the
//! extractor registry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::key::RecordKey;

/// Dispatch tag of an act record.
pub const ACT_KIND: &str = "act";
/// Dispatch tag of an entity record.
pub const ENTITY_KIND: &str = "entity";
/// Dispatch tag of a standalone act participation record.
pub const ACT_PARTICIPATION_KIND: &str = "act_participation";
/// Dispatch tag of a standalone act relationship record.
pub const ACT_RELATIONSHIP_KIND: &str = "act_relationship";
/// Dispatch tag of a standalone entity relationship record.
pub const ENTITY_RELATIONSHIP_KIND: &str = "entity_relationship";

/// Link from one record to another.
///
/// Embedded in an act or entity the source is implicit and left empty.
/// As a standalone record both sides are named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Holder of the relationship, when not implied by the enclosing record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<RecordKey>,
    /// Related counterpart.
    pub target: RecordKey,
    /// Relationship type code (e.g. `"has_component"`).
    #[serde(default)]
    pub relationship_type: String,
}

impl Relationship {
    /// Create an embedded relationship pointing at `target`.
    pub fn to(target: RecordKey, relationship_type: impl Into<String>) -> Self {
        Self {
            source: None,
            target,
            relationship_type: relationship_type.into(),
        }
    }

    /// Create a standalone relationship between `source` and `target`.
    pub fn between(
        source: RecordKey,
        target: RecordKey,
        relationship_type: impl Into<String>,
    ) -> Self {
        Self {
            source: Some(source),
            target,
            relationship_type: relationship_type.into(),
        }
    }
}

/// Participant embedded in an act.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    /// Entity playing the role.
    pub player: RecordKey,
    /// Participation role code (e.g. `"author"`).
    #[serde(default)]
    pub role: String,
}

/// Clinical act: an observation, procedure, encounter and so on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Act {
    /// Outbound act relationships.
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// Participating entities.
    #[serde(default)]
    pub participations: Vec<Participation>,
    /// Act this one is a component of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of: Option<RecordKey>,
}

impl Act {
    /// Create an act with no links.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an outbound relationship.
    pub fn with_relationship(mut self, target: RecordKey, relationship_type: impl Into<String>) -> Self {
        self.relationships.push(Relationship::to(target, relationship_type));
        self
    }

    /// Add a participant.
    pub fn with_participation(mut self, player: RecordKey, role: impl Into<String>) -> Self {
        self.participations.push(Participation {
            player,
            role: role.into(),
        });
        self
    }

    /// Set the containing act.
    pub fn with_container(mut self, container: RecordKey) -> Self {
        self.part_of = Some(container);
        self
    }
}

/// Entity: a person, place, organization, material and so on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Outbound entity relationships.
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// Entity this one is part of (e.g. a ward within a facility).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of: Option<RecordKey>,
}

impl Entity {
    /// Create an entity with no links.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an outbound relationship.
    pub fn with_relationship(mut self, target: RecordKey, relationship_type: impl Into<String>) -> Self {
        self.relationships.push(Relationship::to(target, relationship_type));
        self
    }

    /// Set the containing entity.
    pub fn with_container(mut self, container: RecordKey) -> Self {
        self.part_of = Some(container);
        self
    }
}

/// Standalone participation linking an act and a player entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActParticipation {
    /// Act the participation belongs to.
    pub act: RecordKey,
    /// Entity playing the role.
    pub player: RecordKey,
    /// Participation role code.
    #[serde(default)]
    pub role: String,
}

/// Variant payload of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordBody {
    /// Clinical act.
    Act(Act),
    /// Entity.
    Entity(Entity),
    /// Standalone act participation.
    ActParticipation(ActParticipation),
    /// Standalone act relationship.
    ActRelationship(Relationship),
    /// Standalone entity relationship.
    EntityRelationship(Relationship),
    /// Record kind defined outside this crate.
    Extension {
        /// Dispatch tag of the extension kind.
        name: String,
        /// Free-form payload the registered extractor reads.
        #[serde(default)]
        attributes: Map<String, Value>,
    },
}

impl RecordBody {
    /// Dispatch tag used to look up the dependency extractor.
    pub fn kind(&self) -> &str {
        match self {
            Self::Act(_) => ACT_KIND,
            Self::Entity(_) => ENTITY_KIND,
            Self::ActParticipation(_) => ACT_PARTICIPATION_KIND,
            Self::ActRelationship(_) => ACT_RELATIONSHIP_KIND,
            Self::EntityRelationship(_) => ENTITY_RELATIONSHIP_KIND,
            Self::Extension { name, .. } => name.as_str(),
        }
    }
}

impl From<Act> for RecordBody {
    fn from(act: Act) -> Self {
        Self::Act(act)
    }
}

impl From<Entity> for RecordBody {
    fn from(entity: Entity) -> Self {
        Self::Entity(entity)
    }
}

impl From<ActParticipation> for RecordBody {
    fn from(participation: ActParticipation) -> Self {
        Self::ActParticipation(participation)
    }
}

/// One item of a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Identity key. Absent (or nil) keys cannot be ordered.
    #[serde(default)]
    pub key: Option<RecordKey>,
    /// Variant payload.
    #[serde(flatten)]
    pub body: RecordBody,
}

impl Record {
    /// Create a keyed record.
    pub fn new(key: RecordKey, body: impl Into<RecordBody>) -> Self {
        Self {
            key: Some(key),
            body: body.into(),
        }
    }

    /// Create a record that has not been assigned a key.
    pub fn unkeyed(body: impl Into<RecordBody>) -> Self {
        Self {
            key: None,
            body: body.into(),
        }
    }

    /// Create an extension record of the given kind.
    pub fn extension(key: RecordKey, name: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self::new(
            key,
            RecordBody::Extension {
                name: name.into(),
                attributes,
            },
        )
    }

    /// The record's key, if it is usable for ordering.
    pub fn usable_key(&self) -> Option<RecordKey> {
        self.key.filter(RecordKey::is_usable)
    }

    /// Dispatch tag of the record's variant.
    pub fn kind(&self) -> &str {
        self.body.kind()
    }

    /// Named attribute of an extension record.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        match &self.body {
            RecordBody::Extension { attributes, .. } => attributes.get(name),
            _ => None,
        }
    }
}
