use tokio::{sync::mpsc, task};
use tracing::{debug, error};

use crate::models::aggregation::{AggregationRequest, AggregationResponse};
use crate::models::events::CoordinatorEvent;
use crate::services::aggregation_service::AggregationEngine;
use crate::utils::errors::{Result, SyncError};

/// Runs the O(V·K) aggregation pass off the coordinator's task.
///
/// The worker shares no state with the coordinator: requests go in over one
/// channel and tagged responses come back through the coordinator's inbox.
/// A superseded request is not cancelled; its response is dropped on arrival.
pub struct AggregationWorker {
    request_tx: mpsc::Sender<AggregationRequest>,
    worker: task::JoinHandle<()>,
}

impl AggregationWorker {
    /// Spawn the worker on the blocking pool. Must be called from within a
    /// tokio runtime.
    pub fn spawn(capacity: usize, responses: mpsc::UnboundedSender<CoordinatorEvent>) -> Self {
        let (request_tx, mut request_rx) = mpsc::channel::<AggregationRequest>(capacity.max(1));

        let worker = task::spawn_blocking(move || {
            while let Some(AggregationRequest { tag, exposures, params }) = request_rx.blocking_recv() {
                let (snapshot, skipped) = AggregationEngine::aggregate_raw(tag.era, &exposures, &params);
                debug!(
                    generation = tag.generation,
                    version = tag.version,
                    era = tag.era,
                    validators = snapshot.stakers.len(),
                    "Aggregated era exposures"
                );

                let response = AggregationResponse {
                    tag,
                    snapshot,
                    skipped,
                };
                if responses.send(CoordinatorEvent::Aggregated(response)).is_err() {
                    break;
                }
            }
        });

        Self { request_tx, worker }
    }

    pub async fn dispatch(&self, request: AggregationRequest) -> Result<()> {
        self.request_tx
            .send(request)
            .await
            .map_err(|_| SyncError::WorkerUnavailable)
    }

    /// Close the request channel and wait for the worker to drain.
    pub async fn shutdown(self) {
        drop(self.request_tx);
        if let Err(e) = self.worker.await {
            error!("Aggregation worker terminated abnormally: {:?}", e);
        }
    }
}
