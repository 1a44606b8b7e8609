use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use super::error::TransportError;
use crate::domain::{Record, TopicConfig};

/// Lazy, finite-or-infinite sequence of records read from a topic
pub type RecordStream = Pin<Box<dyn Stream<Item = Result<Record, TransportError>> + Send>>;

/// Opaque token for a reader or writer opened on a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read side of a topic
pub struct TopicReader {
    pub handle: HandleId,
    pub topic: String,
    pub records: RecordStream,
}

/// Accepts records for a topic (at-least-once, best effort)
#[async_trait]
pub trait RecordSink: Send {
    async fn send(&mut self, record: Record) -> Result<(), TransportError>;

    async fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Write side of a topic
pub struct TopicWriter {
    pub handle: HandleId,
    pub topic: String,
    pub sink: Box<dyn RecordSink>,
}

impl TopicWriter {
    pub async fn send(&mut self, record: Record) -> Result<(), TransportError> {
        self.sink.send(record).await
    }

    pub async fn flush(&mut self) -> Result<(), TransportError> {
        self.sink.flush().await
    }
}

/// Capability set the engine needs from a message transport
///
/// Live brokers and the in-memory simulation both implement this; the
/// compiler and the experiment runner are written against it only.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Ensure the given topics exist (idempotent)
    async fn create_topics(&self, topics: &[TopicConfig]) -> Result<(), TransportError>;

    /// Open a read handle positioned at the start of `topic`
    async fn open_reader(&self, topic: &str) -> Result<TopicReader, TransportError>;

    /// Open a write handle for `topic`
    async fn open_writer(&self, topic: &str) -> Result<TopicWriter, TransportError>;

    /// Release a handle previously returned by this transport
    async fn close(&self, handle: HandleId) -> Result<(), TransportError>;
}
