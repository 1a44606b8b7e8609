use thiserror::Error;

use crate::domain::{Edge, EntityId};

/// Structural problems found before any execution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown entity `{id}` referenced by edge {edge}")]
    UnknownEntity { id: EntityId, edge: Edge },

    #[error("Cycle detected: {}", format_path(.0))]
    CycleDetected(Vec<EntityId>),

    #[error("Invalid entity `{id}`: {reason}")]
    InvalidEntityKind { id: EntityId, reason: String },
}

impl ValidationError {
    /// Short machine-readable tag for reports
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnknownEntity { .. } => "UnknownEntity",
            Self::CycleDetected(_) => "CycleDetected",
            Self::InvalidEntityKind { .. } => "InvalidEntityKind",
        }
    }
}

fn format_path(path: &[EntityId]) -> String {
    path.iter()
        .map(EntityId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
