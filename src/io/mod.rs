pub mod csv_reader;
pub mod csv_writer;
pub mod error;
pub mod parse;
pub mod topology_file;

// Re-export commonly used types
pub use csv_reader::CsvRecordStream;
pub use csv_writer::write_outputs;
pub use error::IoError;
pub use parse::RawRecord;
pub use topology_file::{load_experiment_inputs, load_topology, load_topology_def};
