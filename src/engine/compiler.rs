use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::TopologyError;
use super::running::{RunningTopology, release_handles};
use super::tasks::{ErrorContext, Outlets, run_sink, run_source, run_stream};
use super::wiring::Role;
use crate::domain::{Entity, Record, TopicConfig, Topology};
use crate::graph::ExecutionPlan;
use crate::transform::{ErrorPolicy, Pipeline, PropagateErrors};
use crate::transport::{HandleId, TopicReader, TopicWriter, Transport};

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Turns a validated topology into running entity tasks on a transport
///
/// # Example
/// ```rust,ignore
/// let running = TopologyCompiler::new(broker.clone())
///     .with_channel_capacity(128)
///     .with_error_policy(LogAndDrop)
///     .compile(&topology)
///     .await?;
///
/// // ... later
/// let report = running.stop().await;
/// ```
pub struct TopologyCompiler {
    transport: Arc<dyn Transport>,
    error_policy: Arc<dyn ErrorPolicy>,
    channel_capacity: usize,
    dead_letter_topic: Option<TopicConfig>,
}

/// Per-entity resources opened before any task starts
enum Endpoint {
    Source(TopicReader),
    Stream(Pipeline),
    Sink(TopicWriter),
}

impl TopologyCompiler {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            error_policy: Arc::new(PropagateErrors),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            dead_letter_topic: None,
        }
    }

    /// Bound of each entity's inbox (defaults to 64, minimum 1)
    ///
    /// A full inbox blocks the upstream task that feeds it.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Policy consulted when a pipeline stage fails (defaults to propagate)
    pub fn with_error_policy<P>(mut self, policy: P) -> Self
    where
        P: ErrorPolicy + 'static,
    {
        self.error_policy = Arc::new(policy);
        self
    }

    /// Topic receiving records routed by [`ErrorAction::DeadLetter`](crate::transform::ErrorAction)
    pub fn with_dead_letter_topic(mut self, topic: impl Into<String>) -> Self {
        self.dead_letter_topic = Some(TopicConfig::new(topic));
        self
    }

    /// Validate, open transport handles in dependency order, spawn one task per entity
    ///
    /// If any handle fails to open, the ones already opened are released
    /// before the error is returned.
    pub async fn compile(&self, topology: &Topology) -> Result<RunningTopology, TopologyError> {
        let plan = ExecutionPlan::new(topology)?;
        let graph = plan.graph();
        // Arena indices follow registry order
        let entities: Vec<&Entity> = topology.entities().values().collect();

        let mut topics: Vec<TopicConfig> = entities.iter().filter_map(|e| e.topic()).cloned().collect();
        topics.extend(self.dead_letter_topic.clone());
        self.transport.create_topics(&topics).await?;

        let mut acquired: Vec<HandleId> = Vec::new();
        let opened = self.open_endpoints(topology, &plan, &entities, &mut acquired).await;
        let (endpoints, dead_letters) = match opened {
            Ok(opened) => opened,
            Err(err) => {
                release_handles(self.transport.as_ref(), &acquired).await;
                return Err(err);
            }
        };

        // Inbox per non-source entity; upstreams get sender clones
        let mut senders: Vec<Option<mpsc::Sender<Record>>> = vec![None; graph.len()];
        let mut inboxes: Vec<Option<mpsc::Receiver<Record>>> =
            (0..graph.len()).map(|_| None).collect();
        for (node, endpoint) in &endpoints {
            if !matches!(endpoint, Endpoint::Source(_)) {
                let (tx, rx) = mpsc::channel(self.channel_capacity);
                senders[*node] = Some(tx);
                inboxes[*node] = Some(rx);
            }
        }

        let mut outlets: Vec<Option<Outlets>> = (0..graph.len())
            .map(|node| {
                let targets = graph
                    .downstreams(node)
                    .iter()
                    .filter_map(|&d| senders[d].clone().map(|tx| (graph.id(d).clone(), tx)))
                    .collect();
                Some(Outlets::new(targets))
            })
            .collect();
        drop(senders);

        let cancel = CancellationToken::new();
        let errors = ErrorContext {
            policy: self.error_policy.clone(),
            dead_letters,
            cancel: cancel.clone(),
        };

        let mut tasks = Vec::with_capacity(endpoints.len());
        for (node, endpoint) in endpoints {
            let id = graph.id(node).clone();
            let outlet = outlets[node].take().unwrap_or_else(|| Outlets::new(Vec::new()));
            let inbox = inboxes[node].take();

            let task = match (endpoint, inbox) {
                (Endpoint::Source(reader), _) => {
                    tokio::spawn(run_source(id.clone(), reader, outlet, cancel.clone()))
                }
                (Endpoint::Stream(pipeline), Some(inbox)) => {
                    tokio::spawn(run_stream(id.clone(), pipeline, inbox, outlet, errors.clone()))
                }
                (Endpoint::Sink(writer), Some(inbox)) => {
                    tokio::spawn(run_sink(id.clone(), writer, inbox))
                }
                (_, None) => {
                    warn!(entity = %id, "Entity has no inbox; skipping");
                    continue;
                }
            };
            debug!(entity = %id, downstreams = graph.downstreams(node).len(), "Entity task spawned");
            tasks.push((id, task));
        }

        info!(
            entities = tasks.len(),
            edges = topology.workflow().len(),
            handles = acquired.len(),
            "Topology compiled"
        );

        Ok(RunningTopology {
            transport: self.transport.clone(),
            cancel,
            tasks,
            handles: acquired,
        })
    }

    /// Open readers and writers in dependency order, recording each handle
    async fn open_endpoints(
        &self,
        topology: &Topology,
        plan: &ExecutionPlan,
        entities: &[&Entity],
        acquired: &mut Vec<HandleId>,
    ) -> Result<(Vec<(usize, Endpoint)>, Option<Arc<Mutex<TopicWriter>>>), TopologyError> {
        let graph = plan.graph();
        let mut endpoints = Vec::with_capacity(plan.order().len());

        for &node in plan.order() {
            let id = graph.id(node);
            let endpoint = match Role::of(id, entities[node])? {
                Role::Source(topic) => {
                    let reader = self.transport.open_reader(&topic.name).await?;
                    acquired.push(reader.handle);
                    Endpoint::Source(reader)
                }
                Role::Sink(topic) => {
                    let writer = self.transport.open_writer(&topic.name).await?;
                    acquired.push(writer.handle);
                    Endpoint::Sink(writer)
                }
                Role::Stream(pipeline) => Endpoint::Stream(pipeline.clone()),
            };
            debug!(entity = %id, "Entity wired");
            endpoints.push((node, endpoint));
        }

        let dead_letters = match &self.dead_letter_topic {
            Some(topic) => {
                let writer = self.transport.open_writer(&topic.name).await?;
                acquired.push(writer.handle);
                Some(Arc::new(Mutex::new(writer)))
            }
            None => None,
        };

        debug_assert_eq!(endpoints.len(), topology.entities().len());
        Ok((endpoints, dead_letters))
    }
}
