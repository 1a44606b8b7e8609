use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DefinitionError;

/// File-level errors loading topologies and experiment data
#[derive(Error, Debug)]
pub enum IoError {
    #[error("CSV async parsing error: {0}")]
    CsvAsync(#[from] csv_async::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid topology JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}
