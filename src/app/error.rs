use std::io;
use thiserror::Error;

use crate::domain::DefinitionError;
use crate::engine::TopologyError;
use crate::experiment::ExperimentError;
use crate::graph::ValidationError;
use crate::io::IoError;

/// Top-level application errors unifying all layer errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Input error: {0}")]
    Input(#[from] IoError),

    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("Invalid topology: {0}")]
    Validation(#[from] ValidationError),

    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("Experiment failed: {0}")]
    Experiment(#[from] ExperimentError),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}
