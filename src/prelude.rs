//! Prelude module for convenient imports
//!
//! Import everything you need with: `use willa::prelude::*;`

// Domain types
pub use crate::domain::{
    DefinitionError, Edge, Entity, EntityConfig, EntityDef, EntityId, EntityKind, PipelineRegistry,
    Record, RecordFormat, TopicConfig, Topology, TopologyDef,
};

// Transform types
pub use crate::transform::{
    DeadLetter, DeadLetterOnError, ErrorAction, ErrorPolicy, HaltAllOnError, LogAndDrop, Pipeline,
    PropagateErrors, SilentDrop, Stage, TransformError, field_at_least, select_fields,
};

// Graph types
pub use crate::graph::{ExecutionPlan, ValidationError, ValidationReport, render_dot, validate};

// Transport types
pub use crate::transport::{
    HandleId, InMemoryBroker, SimulatedTransport, TopicReader, TopicWriter, Transport,
    TransportError,
};

// Engine types
pub use crate::engine::{
    EntityStats, RunningTopology, TopologyCompiler, TopologyError, TopologyReport,
    TopologyRuntimeError,
};

// Experiment types
pub use crate::experiment::{
    ExperimentError, ExperimentInputs, ExperimentOutputs, ExperimentRunner, run_experiment,
};

// IO types
pub use crate::io::{
    CsvRecordStream, IoError, load_experiment_inputs, load_topology, load_topology_def,
    write_outputs,
};

// App types
pub use crate::app::{AppError, CliApp, Command};
