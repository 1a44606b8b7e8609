pub mod compiler;
pub mod error;
pub mod running;
pub mod tasks;
pub mod wiring;

// Re-export commonly used types
pub use compiler::TopologyCompiler;
pub use error::{TopologyError, TopologyRuntimeError};
pub use running::{RunningTopology, TopologyReport};
pub use tasks::EntityStats;
pub use wiring::Role;
