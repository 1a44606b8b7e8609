pub mod definition;
pub mod entity;
pub mod error;
pub mod record;
pub mod topology;

// Re-export commonly used types
pub use definition::{EntityDef, PipelineRegistry, TopologyDef};
pub use entity::{Entity, EntityConfig, EntityId, EntityKind, RecordFormat, TopicConfig};
pub use error::DefinitionError;
pub use record::Record;
pub use topology::{Edge, Topology};
