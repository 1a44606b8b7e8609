use serde_json::json;
use tracing::{error, warn};

use super::error::TransformError;
use crate::domain::{EntityId, Record};

/// What to do with a record whose pipeline raised an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Halt the entity's branch and surface the error
    Propagate,
    /// Drop the record and keep going
    Skip,
    /// Forward the failed record to the dead-letter topic and keep going
    DeadLetter,
    /// Stop intake across the whole topology
    HaltAll,
}

/// A record that failed a pipeline, routed aside instead of halting
#[derive(Debug, Clone, PartialEq)]
pub struct DeadLetter {
    pub entity: EntityId,
    pub error: TransformError,
    pub record: Record,
}

impl DeadLetter {
    /// Envelope written to a dead-letter topic: original key, wrapped value
    pub fn to_record(&self) -> Record {
        Record {
            key: self.record.key.clone(),
            value: json!({
                "entity": self.entity.as_str(),
                "error": self.error.to_string(),
                "value": self.record.value,
            }),
        }
    }
}

/// Policy hook consulted whenever a stage function fails
pub trait ErrorPolicy: Send + Sync {
    fn on_transform_error(
        &self,
        entity: &EntityId,
        record: &Record,
        error: &TransformError,
    ) -> ErrorAction;
}

/// Surface every failure and halt the failing branch (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct PropagateErrors;

impl ErrorPolicy for PropagateErrors {
    fn on_transform_error(&self, _: &EntityId, _: &Record, _: &TransformError) -> ErrorAction {
        ErrorAction::Propagate
    }
}

/// Log the failure and drop the record
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAndDrop;

impl ErrorPolicy for LogAndDrop {
    fn on_transform_error(
        &self,
        entity: &EntityId,
        record: &Record,
        error: &TransformError,
    ) -> ErrorAction {
        warn!(entity = %entity, key = %record.key, %error, "Dropping record after transform error");
        ErrorAction::Skip
    }
}

/// Drop failed records without logging
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentDrop;

impl ErrorPolicy for SilentDrop {
    fn on_transform_error(&self, _: &EntityId, _: &Record, _: &TransformError) -> ErrorAction {
        ErrorAction::Skip
    }
}

/// Route failed records to the dead-letter topic
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadLetterOnError;

impl ErrorPolicy for DeadLetterOnError {
    fn on_transform_error(
        &self,
        entity: &EntityId,
        record: &Record,
        error: &TransformError,
    ) -> ErrorAction {
        warn!(entity = %entity, key = %record.key, %error, "Dead-lettering record");
        ErrorAction::DeadLetter
    }
}

/// Stop the whole topology on the first failure
#[derive(Debug, Clone, Copy, Default)]
pub struct HaltAllOnError;

impl ErrorPolicy for HaltAllOnError {
    fn on_transform_error(
        &self,
        entity: &EntityId,
        _: &Record,
        error: &TransformError,
    ) -> ErrorAction {
        error!(entity = %entity, %error, "Halting topology after transform error");
        ErrorAction::HaltAll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decide(policy: &dyn ErrorPolicy) -> ErrorAction {
        policy.on_transform_error(
            &EntityId::from("large"),
            &Record::new(1, 2),
            &TransformError::Failed("boom".to_string()),
        )
    }

    #[test]
    fn propagate_is_default_behaviour() {
        assert_eq!(decide(&PropagateErrors), ErrorAction::Propagate);
    }

    #[test]
    fn log_and_drop_skips() {
        assert_eq!(decide(&LogAndDrop), ErrorAction::Skip);
    }

    #[test]
    fn silent_drop_skips() {
        assert_eq!(decide(&SilentDrop), ErrorAction::Skip);
    }

    #[test]
    fn dead_letter_routes() {
        assert_eq!(decide(&DeadLetterOnError), ErrorAction::DeadLetter);
    }

    #[test]
    fn dead_letter_envelope_keeps_key_and_value() {
        let letter = DeadLetter {
            entity: EntityId::from("large"),
            error: TransformError::MissingField("amount".to_string()),
            record: Record::new(7, serde_json::json!({"user-id": 1})),
        };
        let envelope = letter.to_record();
        assert_eq!(envelope.key, serde_json::json!(7));
        assert_eq!(envelope.value["entity"], "large");
        assert_eq!(envelope.value["error"], "Missing field: amount");
        assert_eq!(envelope.value["value"]["user-id"], 1);
    }

    #[test]
    fn halt_all_halts() {
        assert_eq!(decide(&HaltAllOnError), ErrorAction::HaltAll);
    }
}
