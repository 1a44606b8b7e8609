use thiserror::Error;

use crate::domain::EntityId;
use crate::graph::ValidationError;
use crate::transform::TransformError;
use crate::transport::TransportError;

/// Failures that prevent a topology from starting
#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Failure of one entity's task while the topology runs
#[derive(Error, Debug)]
pub enum TopologyRuntimeError {
    #[error("Entity `{entity}` failed to transform a record: {source}")]
    Transform {
        entity: EntityId,
        source: TransformError,
    },

    #[error("Entity `{entity}` lost its transport: {source}")]
    Transport {
        entity: EntityId,
        source: TransportError,
    },

    #[error("Entity `{entity}` task failed: {reason}")]
    TaskFailed { entity: EntityId, reason: String },
}

impl TopologyRuntimeError {
    pub fn entity(&self) -> &EntityId {
        match self {
            Self::Transform { entity, .. }
            | Self::Transport { entity, .. }
            | Self::TaskFailed { entity, .. } => entity,
        }
    }
}
