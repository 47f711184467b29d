//! Core types for bundle reorganization.

pub mod key;
pub mod edge;
pub mod record;

pub use key::RecordKey;
pub use edge::{DependencyEdge, ReferenceKind};
pub use record::{
    Act, ActParticipation, Entity, Participation, Record, RecordBody, Relationship,
    ACT_KIND, ACT_PARTICIPATION_KIND, ACT_RELATIONSHIP_KIND, ENTITY_KIND,
    ENTITY_RELATIONSHIP_KIND,
};
