pub mod cli;
pub mod command;
pub mod error;

// Re-export commonly used types
pub use cli::CliApp;
pub use command::{Command, USAGE};
pub use error::AppError;
