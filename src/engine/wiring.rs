use crate::domain::{Entity, EntityConfig, EntityId, EntityKind, TopicConfig};
use crate::graph::ValidationError;
use crate::transform::Pipeline;

/// What the engine does with an entity, derived from its kind and config
#[derive(Debug, Clone, Copy)]
pub enum Role<'a> {
    Source(&'a TopicConfig),
    Stream(&'a Pipeline),
    Sink(&'a TopicConfig),
}

impl<'a> Role<'a> {
    /// Pair an entity's kind with its config
    ///
    /// Mismatches are already rejected by validation; this stays total
    /// rather than assuming it.
    pub fn of(id: &EntityId, entity: &'a Entity) -> Result<Self, ValidationError> {
        match (entity.kind, &entity.config) {
            (EntityKind::SourceTopic, EntityConfig::Topic(topic)) => Ok(Self::Source(topic)),
            (EntityKind::SinkTopic, EntityConfig::Topic(topic)) => Ok(Self::Sink(topic)),
            (EntityKind::ProcessingStream, EntityConfig::Stream(pipeline)) => {
                Ok(Self::Stream(pipeline))
            }
            (kind, _) => Err(ValidationError::InvalidEntityKind {
                id: id.clone(),
                reason: format!("{kind} has mismatched configuration"),
            }),
        }
    }
}
