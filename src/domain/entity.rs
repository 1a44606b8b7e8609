use std::fmt;

use serde::{Deserialize, Serialize};

use crate::transform::Pipeline;

/// Stable identifier joining the entity registry and the workflow
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Capability of an entity within the topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// Consumable-from topic, always a root of the workflow
    SourceTopic,
    /// Producible-to topic, raw passthrough
    SinkTopic,
    /// Transformable stream carrying a pipeline
    ProcessingStream,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SourceTopic => "source-topic",
            Self::SinkTopic => "sink-topic",
            Self::ProcessingStream => "processing-stream",
        };
        f.write_str(name)
    }
}

/// Serialization format declared for a topic (metadata only)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordFormat {
    #[default]
    Json,
    String,
    Bytes,
}

fn default_partitions() -> u32 {
    1
}

/// Topic metadata for source and sink entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicConfig {
    pub name: String,
    #[serde(default = "default_partitions")]
    pub partitions: u32,
    #[serde(default)]
    pub format: RecordFormat,
}

impl TopicConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partitions: default_partitions(),
            format: RecordFormat::default(),
        }
    }

    pub fn with_partitions(mut self, partitions: u32) -> Self {
        self.partitions = partitions.max(1);
        self
    }

    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = format;
        self
    }
}

/// Kind-specific configuration
///
/// Kept separate from [`EntityKind`] so a mismatched pair (e.g. a sink
/// carrying a pipeline) is representable and rejected by validation.
#[derive(Debug, Clone)]
pub enum EntityConfig {
    Topic(TopicConfig),
    Stream(Pipeline),
}

/// A named node of the topology
#[derive(Debug, Clone)]
pub struct Entity {
    pub kind: EntityKind,
    pub config: EntityConfig,
}

impl Entity {
    pub fn new(kind: EntityKind, config: EntityConfig) -> Self {
        Self { kind, config }
    }

    pub fn source(topic: TopicConfig) -> Self {
        Self::new(EntityKind::SourceTopic, EntityConfig::Topic(topic))
    }

    pub fn sink(topic: TopicConfig) -> Self {
        Self::new(EntityKind::SinkTopic, EntityConfig::Topic(topic))
    }

    pub fn stream(pipeline: Pipeline) -> Self {
        Self::new(EntityKind::ProcessingStream, EntityConfig::Stream(pipeline))
    }

    /// Topic metadata, if this entity is configured as a topic
    pub fn topic(&self) -> Option<&TopicConfig> {
        match &self.config {
            EntityConfig::Topic(topic) => Some(topic),
            EntityConfig::Stream(_) => None,
        }
    }

    /// Attached pipeline, if any
    pub fn pipeline(&self) -> Option<&Pipeline> {
        match &self.config {
            EntityConfig::Stream(pipeline) => Some(pipeline),
            EntityConfig::Topic(_) => None,
        }
    }
}
