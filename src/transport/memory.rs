use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::stream;
use tokio::sync::{Notify, RwLock};
use tracing::debug;

use super::error::TransportError;
use super::handles::{HandleRole, HandleTable};
use super::traits::{HandleId, RecordSink, TopicReader, TopicWriter, Transport};
use crate::domain::{Record, TopicConfig};

/// Append-only log backing one topic
#[derive(Default)]
struct TopicLog {
    records: RwLock<Vec<Record>>,
    appended: Notify,
}

impl TopicLog {
    async fn append(&self, record: Record) {
        self.records.write().await.push(record);
        self.appended.notify_waiters();
    }

    async fn get(&self, offset: usize) -> Option<Record> {
        self.records.read().await.get(offset).cloned()
    }

    async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

/// Live in-process broker
///
/// Topics are append-only logs. Readers subscribe from offset 0 and never
/// end on their own: once caught up they wait for further appends, like a
/// consumer on a real broker. Useful for running compiled topologies in
/// tests and demos without any external infrastructure.
#[derive(Default)]
pub struct InMemoryBroker {
    topics: DashMap<String, Arc<TopicLog>>,
    handles: HandleTable,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self, topic: &str) -> Result<Arc<TopicLog>, TransportError> {
        self.topics
            .get(topic)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| TransportError::TopicNotFound(topic.to_string()))
    }

    /// Append records to a topic, creating it if needed
    pub async fn publish(&self, topic: &str, records: impl IntoIterator<Item = Record>) {
        let log = self.topics.entry(topic.to_string()).or_default().value().clone();
        for record in records {
            log.append(record).await;
        }
    }

    /// Snapshot of everything appended to `topic` so far
    pub async fn records(&self, topic: &str) -> Result<Vec<Record>, TransportError> {
        let log = self.log(topic)?;
        let records = log.records.read().await.clone();
        Ok(records)
    }

    /// Wait until `topic` holds at least `count` records
    pub async fn wait_for(&self, topic: &str, count: usize) -> Result<(), TransportError> {
        let log = self.log(topic)?;
        loop {
            let appended = log.appended.notified();
            if log.len().await >= count {
                return Ok(());
            }
            appended.await;
        }
    }

    /// Number of reader and writer handles not yet closed
    pub fn open_handles(&self) -> usize {
        self.handles.open_count()
    }
}

struct BrokerWriter {
    log: Arc<TopicLog>,
}

#[async_trait]
impl RecordSink for BrokerWriter {
    async fn send(&mut self, record: Record) -> Result<(), TransportError> {
        self.log.append(record).await;
        Ok(())
    }
}

#[async_trait]
impl Transport for InMemoryBroker {
    async fn create_topics(&self, topics: &[TopicConfig]) -> Result<(), TransportError> {
        for topic in topics {
            self.topics.entry(topic.name.clone()).or_default();
            debug!(topic = %topic.name, partitions = topic.partitions, "Topic ready");
        }
        Ok(())
    }

    async fn open_reader(&self, topic: &str) -> Result<TopicReader, TransportError> {
        let log = self.log(topic)?;
        let handle = self.handles.acquire(HandleRole::Reader, topic);

        let records = stream::unfold((log, 0usize), |(log, offset)| async move {
            loop {
                let appended = log.appended.notified();
                match log.get(offset).await {
                    Some(record) => {
                        drop(appended);
                        return Some((Ok::<_, TransportError>(record), (log, offset + 1)));
                    }
                    None => appended.await,
                }
            }
        });

        Ok(TopicReader {
            handle,
            topic: topic.to_string(),
            records: Box::pin(records),
        })
    }

    async fn open_writer(&self, topic: &str) -> Result<TopicWriter, TransportError> {
        let log = self.log(topic)?;
        let handle = self.handles.acquire(HandleRole::Writer, topic);
        Ok(TopicWriter {
            handle,
            topic: topic.to_string(),
            sink: Box::new(BrokerWriter { log }),
        })
    }

    async fn close(&self, handle: HandleId) -> Result<(), TransportError> {
        self.handles.release(handle)
    }
}
