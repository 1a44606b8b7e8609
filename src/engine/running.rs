use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::error::TopologyRuntimeError;
use super::tasks::{EntityStats, TaskResult};
use crate::domain::EntityId;
use crate::transport::{HandleId, Transport, TransportError};

/// Handle to a compiled topology whose entity tasks are running
///
/// Owns every transport handle opened during compilation. Dropping the
/// handle signals cancellation but does not wait for the tasks or release
/// handles; call [`stop`](Self::stop) or [`wait`](Self::wait) for that.
pub struct RunningTopology {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) cancel: CancellationToken,
    pub(crate) tasks: Vec<(EntityId, JoinHandle<TaskResult>)>,
    /// Acquisition order
    pub(crate) handles: Vec<HandleId>,
}

impl RunningTopology {
    /// True once every entity task has ended
    pub fn is_finished(&self) -> bool {
        self.tasks.iter().all(|(_, task)| task.is_finished())
    }

    /// Token that stops source intake when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop pulling from sources, drain in-flight records, release handles
    pub async fn stop(mut self) -> TopologyReport {
        info!(entities = self.tasks.len(), "Stopping topology");
        self.cancel.cancel();
        self.finish().await
    }

    /// Wait for every source to end on its own, then release handles
    ///
    /// Only returns for transports whose readers are finite.
    pub async fn wait(mut self) -> TopologyReport {
        self.finish().await
    }

    async fn finish(&mut self) -> TopologyReport {
        let mut report = TopologyReport::default();

        for (entity, task) in std::mem::take(&mut self.tasks) {
            match task.await {
                Ok(Ok(stats)) => {
                    report.entities.insert(entity, stats);
                }
                Ok(Err(err)) => {
                    warn!(entity = %err.entity(), error = %err, "Entity task failed");
                    report.errors.push(err);
                }
                Err(join_err) => report.errors.push(TopologyRuntimeError::TaskFailed {
                    entity,
                    reason: join_err.to_string(),
                }),
            }
        }

        let handles = std::mem::take(&mut self.handles);
        report.release_failures = release_handles(self.transport.as_ref(), &handles).await;

        info!(
            entities = report.entities.len(),
            errors = report.errors.len(),
            release_failures = report.release_failures.len(),
            "Topology stopped"
        );
        report
    }
}

impl Drop for RunningTopology {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Close handles newest-first, attempting every one
pub(crate) async fn release_handles(
    transport: &dyn Transport,
    handles: &[HandleId],
) -> Vec<(HandleId, TransportError)> {
    let mut failures = Vec::new();
    for &handle in handles.iter().rev() {
        if let Err(err) = transport.close(handle).await {
            warn!(%handle, error = %err, "Failed to release transport handle");
            failures.push((handle, err));
        }
    }
    failures
}

/// Outcome of a topology run
#[derive(Debug, Default)]
pub struct TopologyReport {
    /// Counters for every entity whose task ended cleanly
    pub entities: BTreeMap<EntityId, EntityStats>,
    pub errors: Vec<TopologyRuntimeError>,
    pub release_failures: Vec<(HandleId, TransportError)>,
}

impl TopologyReport {
    pub fn all_succeeded(&self) -> bool {
        self.errors.is_empty() && self.release_failures.is_empty()
    }

    pub fn stats(&self, entity: &EntityId) -> Option<&EntityStats> {
        self.entities.get(entity)
    }
}
