//! Asynchronous sensor-update pipeline
//!
//! Ingress pushes parsed updates onto one shared bounded queue; a fixed pool
//! of workers drains it FIFO and applies each delta to the store. The push
//! side blocks when the queue is full - sensors tolerate send delay, so this
//! is the one place backpressure is allowed to reach a network peer.
//! Free-count changes fan out through the store's change listener.

use std::sync::Arc;

use crossfire::{MAsyncRx, MAsyncTx, SendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use lotd_store::LotStore;

use crate::update::SensorUpdate;

/// Default number of update workers
pub const DEFAULT_WORKERS: usize = 3;

/// Default capacity of the shared update queue
pub const DEFAULT_QUEUE_SIZE: usize = 1024;

/// Sending half of the update queue, handed to the sensor listener
#[derive(Clone)]
pub struct UpdateSender {
    tx: MAsyncTx<SensorUpdate>,
}

impl UpdateSender {
    /// Enqueue an update, waiting while the queue is full
    ///
    /// Fails only when the pipeline has shut down.
    pub async fn send(&self, update: SensorUpdate) -> Result<(), SendError<SensorUpdate>> {
        self.tx.send(update).await
    }
}

impl std::fmt::Debug for UpdateSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateSender").finish()
    }
}

/// The bounded work queue and its worker pool
pub struct UpdatePipeline {
    sender: UpdateSender,
    workers: Vec<JoinHandle<()>>,
}

impl UpdatePipeline {
    /// Spawn `workers` tasks draining a queue of `queue_size` entries
    pub fn start(
        store: Arc<LotStore>,
        workers: usize,
        queue_size: usize,
        cancel: CancellationToken,
    ) -> Self {
        let workers = workers.max(1);
        let queue_size = queue_size.max(1);
        let (tx, rx) = crossfire::mpmc::bounded_async::<SensorUpdate>(queue_size);

        let handles = (0..workers)
            .map(|worker| {
                let store = Arc::clone(&store);
                let rx = rx.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move { run_worker(worker, store, rx, cancel).await })
            })
            .collect();

        info!(workers, queue_size, "update pipeline started");
        Self {
            sender: UpdateSender { tx },
            workers: handles,
        }
    }

    /// A clone of the queue's sending half
    pub fn sender(&self) -> UpdateSender {
        self.sender.clone()
    }

    /// Number of workers in the pool
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Wait for every worker to finish
    ///
    /// Workers exit when the cancellation token fires or all senders are
    /// dropped.
    pub async fn join(self) {
        drop(self.sender);
        for handle in self.workers {
            let _ = handle.await;
        }
    }
}

async fn run_worker(
    worker: usize,
    store: Arc<LotStore>,
    rx: MAsyncRx<SensorUpdate>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            received = rx.recv() => {
                let Ok(update) = received else {
                    // All senders gone
                    break;
                };
                if let Some((old_free, new_free)) =
                    store.apply_sensor_delta(&update.lot_id, update.delta)
                {
                    debug!(
                        worker,
                        lot_id = %update.lot_id,
                        delta = update.delta,
                        old_free,
                        new_free,
                        "sensor delta applied"
                    );
                }
            }
        }
    }
    debug!(worker, "update worker stopped");
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
