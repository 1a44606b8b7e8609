use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityConfig, EntityId, EntityKind, TopicConfig};
use super::error::DefinitionError;
use super::topology::{Edge, Topology};
use crate::transform::Pipeline;

/// Serialized form of a single entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<TopicConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,
}

/// Data shape of a topology, suitable for storing and diffing
///
/// ```json
/// {
///   "entities": {
///     "orders": {"kind": "source-topic", "topic": {"name": "orders"}},
///     "large":  {"kind": "processing-stream", "pipeline": "large-orders"},
///     "alerts": {"kind": "sink-topic"}
///   },
///   "workflow": [["orders", "large"], ["large", "alerts"]]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyDef {
    pub entities: BTreeMap<EntityId, EntityDef>,
    #[serde(default)]
    pub workflow: Vec<Edge>,
}

impl TopologyDef {
    /// Bind pipeline names to registered pipelines
    ///
    /// Structural mismatches (a pipeline on a topic, a topic on a stream)
    /// are carried into the topology so validation can report them with
    /// the offending entity id.
    pub fn resolve(&self, registry: &PipelineRegistry) -> Result<Topology, DefinitionError> {
        let mut entities = Vec::with_capacity(self.entities.len());

        for (id, def) in &self.entities {
            let lookup = |name: &String| {
                registry
                    .get(name)
                    .cloned()
                    .ok_or_else(|| DefinitionError::UnknownPipeline {
                        entity: id.clone(),
                        pipeline: name.clone(),
                    })
            };

            let config = match def.kind {
                EntityKind::SourceTopic | EntityKind::SinkTopic => match &def.pipeline {
                    Some(name) => EntityConfig::Stream(lookup(name)?),
                    None => EntityConfig::Topic(
                        def.topic
                            .clone()
                            .unwrap_or_else(|| TopicConfig::new(id.as_str())),
                    ),
                },
                EntityKind::ProcessingStream => match (&def.topic, &def.pipeline) {
                    (Some(topic), _) => EntityConfig::Topic(topic.clone()),
                    (None, Some(name)) => EntityConfig::Stream(lookup(name)?),
                    (None, None) => EntityConfig::Stream(Pipeline::identity()),
                },
            };

            entities.push((id.clone(), Entity::new(def.kind, config)));
        }

        Ok(Topology::from_parts(entities, self.workflow.iter().cloned()))
    }
}

impl Topology {
    /// Project back onto the data shape; anonymous pipelines serialize as absent
    pub fn to_def(&self) -> TopologyDef {
        let entities = self
            .entities()
            .iter()
            .map(|(id, entity)| {
                let (topic, pipeline) = match &entity.config {
                    EntityConfig::Topic(topic) => (Some(topic.clone()), None),
                    EntityConfig::Stream(pipeline) => (None, pipeline.name().map(str::to_string)),
                };
                (
                    id.clone(),
                    EntityDef {
                        kind: entity.kind,
                        topic,
                        pipeline,
                    },
                )
            })
            .collect();

        TopologyDef {
            entities,
            workflow: self.workflow().to_vec(),
        }
    }
}

/// Named pipelines available to serialized definitions
#[derive(Debug, Clone, Default)]
pub struct PipelineRegistry {
    pipelines: HashMap<String, Pipeline>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `identity`
    pub fn with_builtins() -> Self {
        Self::new().register("identity", Pipeline::identity())
    }

    /// Register a pipeline; the pipeline takes the registered name
    pub fn register(mut self, name: impl Into<String>, pipeline: Pipeline) -> Self {
        let name = name.into();
        self.pipelines.insert(name.clone(), pipeline.named(name));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.get(name)
    }
}
