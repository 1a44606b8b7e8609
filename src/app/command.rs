use std::path::PathBuf;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use super::error::AppError;
use crate::domain::PipelineRegistry;
use crate::experiment::run_experiment;
use crate::graph::{ValidationReport, render_dot, validate};
use crate::io::{IoError, load_experiment_inputs, load_topology, write_outputs};

pub const USAGE: &str = "\
Usage:
  willa validate <topology.json>
  willa render <topology.json>
  willa experiment <topology.json> <inputs-dir>";

/// A parsed `willa` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print a JSON validation report; fails when the topology is invalid
    Validate { topology: PathBuf },
    /// Print the workflow as a Graphviz digraph
    Render { topology: PathBuf },
    /// Dry-run the topology over `<inputs-dir>/<source-id>.csv` files
    Experiment { topology: PathBuf, inputs: PathBuf },
}

impl Command {
    /// Parse `argv`, program name included
    pub fn parse(args: &[String]) -> Result<Self, AppError> {
        let rest: Vec<&str> = args.iter().skip(1).map(String::as_str).collect();
        match rest.as_slice() {
            ["validate", topology] => Ok(Self::Validate {
                topology: PathBuf::from(topology),
            }),
            ["render", topology] => Ok(Self::Render {
                topology: PathBuf::from(topology),
            }),
            ["experiment", topology, inputs] => Ok(Self::Experiment {
                topology: PathBuf::from(topology),
                inputs: PathBuf::from(inputs),
            }),
            _ => Err(AppError::InvalidArguments(USAGE.to_string())),
        }
    }

    /// Run the command, writing its report to `out`
    pub async fn execute<W>(self, registry: &PipelineRegistry, mut out: W) -> Result<(), AppError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        match self {
            Self::Validate { topology } => {
                let topology = load_topology(&topology, registry).await?;
                let result = validate(&topology);
                let report = serde_json::to_string(&ValidationReport::from(result.clone()))
                    .map_err(IoError::from)?;
                out.write_all(report.as_bytes()).await?;
                out.write_all(b"\n").await?;
                out.flush().await?;
                result?;
            }
            Self::Render { topology } => {
                let topology = load_topology(&topology, registry).await?;
                out.write_all(render_dot(&topology).as_bytes()).await?;
                out.flush().await?;
            }
            Self::Experiment { topology, inputs } => {
                let topology = load_topology(&topology, registry).await?;
                let inputs = load_experiment_inputs(&inputs, &topology).await?;
                let outputs = run_experiment(&topology, &inputs)?;
                info!(entities = outputs.entities.len(), "Experiment finished");
                if !outputs.dead_letters.is_empty() {
                    warn!(count = outputs.dead_letters.len(), "Records were dead-lettered");
                }
                write_outputs(&outputs, &mut out).await?;
                out.flush().await?;
            }
        }
        Ok(())
    }
}
