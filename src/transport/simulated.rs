use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::stream;

use super::error::TransportError;
use super::handles::{HandleRole, HandleTable};
use super::traits::{HandleId, RecordSink, TopicReader, TopicWriter, Transport};
use crate::domain::{Record, TopicConfig};

/// Finite, seeded in-memory transport
///
/// Readers replay a snapshot of the topic and then end, so anything driven
/// by this transport runs to completion. Every future it returns is ready
/// on first poll.
#[derive(Default)]
pub struct SimulatedTransport {
    topics: Arc<DashMap<String, Vec<Record>>>,
    handles: HandleTable,
}

impl SimulatedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose topics start out holding the given records
    pub fn seeded<I, R>(topics: I) -> Self
    where
        I: IntoIterator<Item = (String, R)>,
        R: IntoIterator<Item = Record>,
    {
        let transport = Self::new();
        for (name, records) in topics {
            transport.topics.entry(name).or_default().extend(records);
        }
        transport
    }

    /// Snapshot of a topic's contents
    pub fn topic(&self, name: &str) -> Option<Vec<Record>> {
        self.topics.get(name).map(|entry| entry.value().clone())
    }

    pub fn open_handles(&self) -> usize {
        self.handles.open_count()
    }
}

struct SimulatedWriter {
    topic: String,
    topics: Arc<DashMap<String, Vec<Record>>>,
}

#[async_trait]
impl RecordSink for SimulatedWriter {
    async fn send(&mut self, record: Record) -> Result<(), TransportError> {
        self.topics
            .get_mut(&self.topic)
            .map(|mut entry| entry.push(record))
            .ok_or_else(|| TransportError::Closed(self.topic.clone()))
    }
}

#[async_trait]
impl Transport for SimulatedTransport {
    async fn create_topics(&self, topics: &[TopicConfig]) -> Result<(), TransportError> {
        for topic in topics {
            self.topics.entry(topic.name.clone()).or_default();
        }
        Ok(())
    }

    async fn open_reader(&self, topic: &str) -> Result<TopicReader, TransportError> {
        let snapshot = self
            .topic(topic)
            .ok_or_else(|| TransportError::TopicNotFound(topic.to_string()))?;
        let handle = self.handles.acquire(HandleRole::Reader, topic);

        Ok(TopicReader {
            handle,
            topic: topic.to_string(),
            records: Box::pin(stream::iter(snapshot.into_iter().map(Ok::<Record, TransportError>))),
        })
    }

    async fn open_writer(&self, topic: &str) -> Result<TopicWriter, TransportError> {
        if !self.topics.contains_key(topic) {
            return Err(TransportError::TopicNotFound(topic.to_string()));
        }
        let handle = self.handles.acquire(HandleRole::Writer, topic);

        Ok(TopicWriter {
            handle,
            topic: topic.to_string(),
            sink: Box::new(SimulatedWriter {
                topic: topic.to_string(),
                topics: self.topics.clone(),
            }),
        })
    }

    async fn close(&self, handle: HandleId) -> Result<(), TransportError> {
        self.handles.release(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn seeded_reader_replays_then_ends() {
        let transport = SimulatedTransport::seeded([(
            "in".to_string(),
            vec![Record::new(1, "a"), Record::new(2, "b")],
        )]);

        let reader = transport.open_reader("in").await.unwrap();
        let records: Vec<Record> = reader.records.try_collect().await.unwrap();

        assert_eq!(records, vec![Record::new(1, "a"), Record::new(2, "b")]);
    }

    #[tokio::test]
    async fn created_topics_start_empty() {
        let transport = SimulatedTransport::new();
        transport.create_topics(&[TopicConfig::new("t")]).await.unwrap();
        assert_eq!(transport.topic("t"), Some(vec![]));
        assert_eq!(transport.topic("other"), None);
    }

    #[tokio::test]
    async fn writer_appends_in_order() {
        let transport = SimulatedTransport::new();
        transport.create_topics(&[TopicConfig::new("out")]).await.unwrap();

        let mut writer = transport.open_writer("out").await.unwrap();
        writer.send(Record::new(1, 1)).await.unwrap();
        writer.send(Record::new(2, 2)).await.unwrap();
        transport.close(writer.handle).await.unwrap();

        assert_eq!(
            transport.topic("out").unwrap(),
            vec![Record::new(1, 1), Record::new(2, 2)]
        );
        assert_eq!(transport.open_handles(), 0);
    }

    #[test]
    fn futures_complete_without_a_runtime() {
        let transport = SimulatedTransport::seeded([("in".to_string(), vec![Record::new(1, 1)])]);
        let records: Vec<Record> = futures::executor::block_on(async {
            let reader = transport.open_reader("in").await?;
            reader.records.try_collect().await
        })
        .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn writer_on_missing_topic_fails() {
        let transport = SimulatedTransport::new();
        assert!(transport.open_writer("missing").await.is_err());
    }
}
