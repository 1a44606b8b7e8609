use std::collections::BTreeMap;
use std::sync::Arc;

use futures::TryStreamExt;
use futures::executor::block_on;
use tracing::debug;

use super::error::ExperimentError;
use crate::domain::{EntityId, EntityKind, Record, TopicConfig, Topology};
use crate::engine::Role;
use crate::graph::ExecutionPlan;
use crate::transform::{DeadLetter, ErrorAction, ErrorPolicy, Pipeline, PropagateErrors};
use crate::transport::{SimulatedTransport, Transport};

/// Literal records per source entity
pub type ExperimentInputs = BTreeMap<EntityId, Vec<Record>>;

/// Records that passed through each entity during a dry run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentOutputs {
    /// Every entity of the topology; unreached entities map to an empty sequence
    pub entities: BTreeMap<EntityId, Vec<Record>>,
    /// Records routed aside by a dead-letter policy
    pub dead_letters: Vec<DeadLetter>,
}

impl ExperimentOutputs {
    pub fn records(&self, entity: &EntityId) -> &[Record] {
        self.entities.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Finite, synchronous dry run of a topology against literal inputs
///
/// Uses the same plan and entity wiring as the live compiler, but over a
/// [`SimulatedTransport`] whose readers replay the inputs and end. Each
/// entity is evaluated to completion in dependency order on the calling
/// thread; nothing is spawned and nothing outlives the call.
///
/// Merge order is fixed: an entity with several upstreams sees all records
/// of its first declared incoming edge, then the second, and so on.
///
/// # Example
/// ```rust,ignore
/// let outputs = ExperimentRunner::new().run(&topology, &inputs)?;
/// assert_eq!(outputs.records(&"alerts".into()).len(), 1);
/// ```
pub struct ExperimentRunner {
    error_policy: Arc<dyn ErrorPolicy>,
}

impl Default for ExperimentRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ExperimentRunner {
    pub fn new() -> Self {
        Self {
            error_policy: Arc::new(PropagateErrors),
        }
    }

    /// Policy consulted when a stage fails (defaults to propagate)
    pub fn with_error_policy<P>(mut self, policy: P) -> Self
    where
        P: ErrorPolicy + 'static,
    {
        self.error_policy = Arc::new(policy);
        self
    }

    pub fn run(
        &self,
        topology: &Topology,
        inputs: &ExperimentInputs,
    ) -> Result<ExperimentOutputs, ExperimentError> {
        let plan = ExecutionPlan::new(topology)?;
        let graph = plan.graph();

        for id in inputs.keys() {
            let node = graph
                .index_of(id)
                .ok_or_else(|| ExperimentError::UnknownInput(id.clone()))?;
            let kind = graph.kind(node);
            if kind != EntityKind::SourceTopic {
                return Err(ExperimentError::InputForNonSource {
                    id: id.clone(),
                    kind,
                });
            }
        }

        let entities: Vec<_> = topology.entities().iter().collect();
        // Sinks deliver here; sources replay from their own seeded transport
        let transport = SimulatedTransport::new();
        let topics: Vec<TopicConfig> = entities
            .iter()
            .filter_map(|(_, entity)| entity.topic())
            .cloned()
            .collect();
        block_on(transport.create_topics(&topics))?;

        let mut produced: Vec<Vec<Record>> = vec![Vec::new(); graph.len()];
        let mut dead_letters = Vec::new();

        for &node in plan.order() {
            let (id, entity) = entities[node];
            let merged = || -> Vec<Record> {
                graph
                    .upstreams(node)
                    .iter()
                    .flat_map(|&up| produced[up].iter().cloned())
                    .collect()
            };

            let records = match Role::of(id, entity)? {
                Role::Source(topic) => replay(topic, inputs.get(id).cloned().unwrap_or_default())?,
                Role::Stream(pipeline) => {
                    let input = merged();
                    self.transform(id, pipeline, input, &mut dead_letters)?
                }
                Role::Sink(topic) => {
                    let input = merged();
                    deliver(&transport, topic, &input)?;
                    input
                }
            };

            debug!(entity = %id, records = records.len(), "Experiment step");
            produced[node] = records;
        }

        let entities = entities
            .into_iter()
            .zip(produced)
            .map(|((id, _), records)| (id.clone(), records))
            .collect();

        Ok(ExperimentOutputs {
            entities,
            dead_letters,
        })
    }

    fn transform(
        &self,
        id: &EntityId,
        pipeline: &Pipeline,
        input: Vec<Record>,
        dead_letters: &mut Vec<DeadLetter>,
    ) -> Result<Vec<Record>, ExperimentError> {
        let mut output = Vec::with_capacity(input.len());

        for record in input {
            match pipeline.apply(record.clone()) {
                Ok(Some(out)) => output.push(out),
                Ok(None) => {}
                Err(error) => match self.error_policy.on_transform_error(id, &record, &error) {
                    ErrorAction::Skip => {}
                    ErrorAction::DeadLetter => dead_letters.push(DeadLetter {
                        entity: id.clone(),
                        error,
                        record,
                    }),
                    ErrorAction::Propagate | ErrorAction::HaltAll => {
                        return Err(ExperimentError::Transform {
                            entity: id.clone(),
                            source: error,
                        });
                    }
                },
            }
        }

        Ok(output)
    }
}

/// Replay one source's inputs through a transport seeded for that source alone
///
/// Sources sharing a topic name each see only the records supplied for them.
fn replay(topic: &TopicConfig, records: Vec<Record>) -> Result<Vec<Record>, ExperimentError> {
    let transport = SimulatedTransport::seeded([(topic.name.clone(), records)]);
    let reader = block_on(transport.open_reader(&topic.name))?;
    let records = block_on(reader.records.try_collect());
    block_on(transport.close(reader.handle))?;
    Ok(records?)
}

/// Write records to a simulated sink topic
fn deliver(
    transport: &SimulatedTransport,
    topic: &TopicConfig,
    records: &[Record],
) -> Result<(), ExperimentError> {
    let mut writer = block_on(transport.open_writer(&topic.name))?;
    let sent = block_on(async {
        for record in records {
            writer.send(record.clone()).await?;
        }
        writer.flush().await
    });
    block_on(transport.close(writer.handle))?;
    Ok(sent?)
}

/// Run an experiment with the default (propagating) error policy
pub fn run_experiment(
    topology: &Topology,
    inputs: &ExperimentInputs,
) -> Result<ExperimentOutputs, ExperimentError> {
    ExperimentRunner::new().run(topology, inputs)
}
