pub mod error;
pub mod pipeline;
pub mod policy;
pub mod stages;

// Re-export commonly used types
pub use error::TransformError;
pub use pipeline::{Mapper, Pipeline, Predicate, Stage};
pub use policy::{
    DeadLetter, DeadLetterOnError, ErrorAction, ErrorPolicy, HaltAllOnError, LogAndDrop, PropagateErrors,
    SilentDrop,
};
pub use stages::{field_at_least, select_fields};
