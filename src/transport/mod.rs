pub mod error;
pub mod handles;
pub mod memory;
pub mod simulated;
pub mod traits;

// Re-export commonly used types
pub use error::TransportError;
pub use handles::{HandleRole, HandleTable};
pub use memory::InMemoryBroker;
pub use simulated::SimulatedTransport;
pub use traits::{HandleId, RecordSink, RecordStream, TopicReader, TopicWriter, Transport};
