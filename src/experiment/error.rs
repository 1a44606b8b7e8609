use thiserror::Error;

use crate::domain::{EntityId, EntityKind};
use crate::graph::ValidationError;
use crate::transform::TransformError;
use crate::transport::TransportError;

/// Failures of a dry run
#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Input supplied for unknown entity `{0}`")]
    UnknownInput(EntityId),

    #[error("Input supplied for `{id}`, which is a {kind}; only source-topic entities take input")]
    InputForNonSource { id: EntityId, kind: EntityKind },

    #[error("Entity `{entity}` failed to transform a record: {source}")]
    Transform {
        entity: EntityId,
        source: TransformError,
    },

    #[error("Simulated transport error: {0}")]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            ExperimentError::UnknownInput("ghost".into()).to_string(),
            "Input supplied for unknown entity `ghost`"
        );
        assert_eq!(
            ExperimentError::InputForNonSource {
                id: "large".into(),
                kind: EntityKind::ProcessingStream,
            }
            .to_string(),
            "Input supplied for `large`, which is a processing-stream; only source-topic entities take input"
        );
    }

    #[test]
    fn validation_error_conversion() {
        let err = ExperimentError::from(ValidationError::CycleDetected(vec!["a".into()]));
        assert!(matches!(err, ExperimentError::Validation(ValidationError::CycleDetected(_))));
    }
}
