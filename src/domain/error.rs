use thiserror::Error;

use super::entity::EntityId;

/// Errors binding a serialized definition to runnable pipelines
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Entity `{entity}` references unregistered pipeline `{pipeline}`")]
    UnknownPipeline { entity: EntityId, pipeline: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_entity_and_pipeline() {
        let err = DefinitionError::UnknownPipeline {
            entity: EntityId::from("large"),
            pipeline: "big-orders".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Entity `large` references unregistered pipeline `big-orders`"
        );
    }
}
