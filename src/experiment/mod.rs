pub mod error;
pub mod runner;

// Re-export commonly used types
pub use error::ExperimentError;
pub use runner::{ExperimentInputs, ExperimentOutputs, ExperimentRunner, run_experiment};
