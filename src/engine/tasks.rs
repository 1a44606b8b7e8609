//! Bodies of the per-entity tasks spawned by the compiler.
//!
//! Every non-source entity owns a bounded inbox; upstream tasks hold clones
//! of its sender. When the last upstream task ends its senders drop, the
//! inbox drains and closes, and the downstream task finishes in turn.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::TopologyRuntimeError;
use crate::domain::{EntityId, Record};
use crate::transform::{DeadLetter, ErrorAction, ErrorPolicy, Pipeline};
use crate::transport::{TopicReader, TopicWriter};

pub(crate) type TaskResult = Result<EntityStats, TopologyRuntimeError>;

/// Per-entity record counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityStats {
    pub records_in: u64,
    pub records_out: u64,
    pub records_dropped: u64,
}

/// Fan-out to every downstream inbox
pub(crate) struct Outlets {
    targets: Vec<(EntityId, mpsc::Sender<Record>)>,
    wired: bool,
}

impl Outlets {
    pub(crate) fn new(targets: Vec<(EntityId, mpsc::Sender<Record>)>) -> Self {
        let wired = !targets.is_empty();
        Self { targets, wired }
    }

    /// Push one record to every downstream that is still listening
    ///
    /// Each record goes out whole. Returns `false` once every downstream
    /// this entity was wired to has gone away.
    pub(crate) async fn forward(&mut self, from: &EntityId, record: Record) -> bool {
        let mut open = Vec::with_capacity(self.targets.len());
        for (downstream, tx) in self.targets.drain(..) {
            if tx.send(record.clone()).await.is_ok() {
                open.push((downstream, tx));
            } else {
                debug!(entity = %from, downstream = %downstream, "Downstream closed");
            }
        }
        self.targets = open;
        !(self.wired && self.targets.is_empty())
    }
}

/// Shared state for applying the error policy inside stream tasks
#[derive(Clone)]
pub(crate) struct ErrorContext {
    pub policy: Arc<dyn ErrorPolicy>,
    pub dead_letters: Option<Arc<Mutex<TopicWriter>>>,
    pub cancel: CancellationToken,
}

/// Pull from a topic until exhausted, cancelled, or orphaned
pub(crate) async fn run_source(
    id: EntityId,
    mut reader: TopicReader,
    mut outlets: Outlets,
    cancel: CancellationToken,
) -> TaskResult {
    let mut stats = EntityStats::default();
    debug!(entity = %id, topic = %reader.topic, "Source started");

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = reader.records.next() => next,
        };

        match next {
            Some(Ok(record)) => {
                stats.records_in += 1;
                stats.records_out += 1;
                if !outlets.forward(&id, record).await {
                    break;
                }
            }
            Some(Err(source)) => {
                return Err(TopologyRuntimeError::Transport { entity: id, source });
            }
            None => break,
        }
    }

    debug!(entity = %id, records = stats.records_out, "Source finished");
    Ok(stats)
}

/// Apply the entity's pipeline to its merged inbox
pub(crate) async fn run_stream(
    id: EntityId,
    pipeline: Pipeline,
    mut inbox: mpsc::Receiver<Record>,
    mut outlets: Outlets,
    errors: ErrorContext,
) -> TaskResult {
    let mut stats = EntityStats::default();

    while let Some(record) = inbox.recv().await {
        stats.records_in += 1;

        match pipeline.apply(record.clone()) {
            Ok(Some(out)) => {
                stats.records_out += 1;
                if !outlets.forward(&id, out).await {
                    break;
                }
            }
            Ok(None) => stats.records_dropped += 1,
            Err(error) => match errors.policy.on_transform_error(&id, &record, &error) {
                ErrorAction::Skip => stats.records_dropped += 1,
                ErrorAction::DeadLetter => {
                    let Some(writer) = &errors.dead_letters else {
                        warn!(entity = %id, "No dead-letter topic configured; propagating");
                        return Err(TopologyRuntimeError::Transform { entity: id, source: error });
                    };
                    let letter = DeadLetter {
                        entity: id.clone(),
                        error,
                        record,
                    };
                    writer
                        .lock()
                        .await
                        .send(letter.to_record())
                        .await
                        .map_err(|source| TopologyRuntimeError::Transport {
                            entity: id.clone(),
                            source,
                        })?;
                    stats.records_dropped += 1;
                }
                ErrorAction::HaltAll => {
                    errors.cancel.cancel();
                    return Err(TopologyRuntimeError::Transform { entity: id, source: error });
                }
                ErrorAction::Propagate => {
                    return Err(TopologyRuntimeError::Transform { entity: id, source: error });
                }
            },
        }
    }

    debug!(entity = %id, records_in = stats.records_in, records_out = stats.records_out, "Stream finished");
    Ok(stats)
}

/// Forward every record verbatim to the sink topic
pub(crate) async fn run_sink(
    id: EntityId,
    mut writer: TopicWriter,
    mut inbox: mpsc::Receiver<Record>,
) -> TaskResult {
    let mut stats = EntityStats::default();

    while let Some(record) = inbox.recv().await {
        stats.records_in += 1;
        writer
            .send(record)
            .await
            .map_err(|source| TopologyRuntimeError::Transport {
                entity: id.clone(),
                source,
            })?;
        stats.records_out += 1;
    }

    writer
        .flush()
        .await
        .map_err(|source| TopologyRuntimeError::Transport {
            entity: id.clone(),
            source,
        })?;

    debug!(entity = %id, topic = %writer.topic, records = stats.records_out, "Sink finished");
    Ok(stats)
}
