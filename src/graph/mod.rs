pub mod error;
pub mod plan;
pub mod render;
pub mod validate;

// Re-export commonly used types
pub use error::ValidationError;
pub use plan::{ExecutionPlan, WorkflowGraph};
pub use render::render_dot;
pub use validate::{ValidationReport, validate};
