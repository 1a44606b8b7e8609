use std::path::Path;

use futures::TryStreamExt;
use tracing::debug;

use super::csv_reader::CsvRecordStream;
use super::error::IoError;
use crate::domain::{EntityKind, PipelineRegistry, Topology, TopologyDef};
use crate::experiment::ExperimentInputs;

/// Read a JSON topology definition
pub async fn load_topology_def(path: impl AsRef<Path>) -> Result<TopologyDef, IoError> {
    let text = tokio::fs::read_to_string(path.as_ref()).await?;
    Ok(serde_json::from_str(&text)?)
}

/// Read a JSON topology definition and bind its pipelines
pub async fn load_topology(
    path: impl AsRef<Path>,
    registry: &PipelineRegistry,
) -> Result<Topology, IoError> {
    let def = load_topology_def(path).await?;
    Ok(def.resolve(registry)?)
}

/// Collect experiment inputs from `<dir>/<entity-id>.csv`, one file per source
///
/// Sources without a file are left out of the inputs and replay nothing.
pub async fn load_experiment_inputs(
    dir: impl AsRef<Path>,
    topology: &Topology,
) -> Result<ExperimentInputs, IoError> {
    let dir = dir.as_ref();
    if !tokio::fs::metadata(dir).await?.is_dir() {
        return Err(IoError::NotADirectory(dir.to_path_buf()));
    }

    let mut inputs = ExperimentInputs::new();
    for (id, entity) in topology.entities() {
        if entity.kind != EntityKind::SourceTopic {
            continue;
        }
        let path = dir.join(format!("{id}.csv"));
        if !tokio::fs::try_exists(&path).await? {
            debug!(entity = %id, path = %path.display(), "No input file for source");
            continue;
        }
        let records = CsvRecordStream::from_file(&path).await?.try_collect().await?;
        inputs.insert(id.clone(), records);
    }

    Ok(inputs)
}
