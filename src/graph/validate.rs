use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::plan::ExecutionPlan;
use crate::domain::Topology;

/// Check a topology without touching any transport
///
/// Runs referential integrity, acyclicity and kind checks, in that order,
/// and stops at the first failure.
pub fn validate(topology: &Topology) -> Result<(), ValidationError> {
    ExecutionPlan::new(topology).map(|_| ())
}

/// Serializable outcome of [`validate`] for tooling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ValidationReport {
    pub fn for_topology(topology: &Topology) -> Self {
        Self::from(validate(topology))
    }
}

impl From<Result<(), ValidationError>> for ValidationReport {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self {
                ok: true,
                reason: None,
                detail: None,
            },
            Err(err) => Self {
                ok: false,
                reason: Some(err.reason().to_string()),
                detail: Some(err.to_string()),
            },
        }
    }
}
