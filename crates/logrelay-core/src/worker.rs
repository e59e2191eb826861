//! The worker pool: N long-lived tasks draining the intake buffer through
//! the dispatcher.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::buffer::{IntakeBuffer, TakeOutcome};
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::statistics::Statistics;

/// Handle to a spawned worker pool. `join` waits for every worker to exit,
/// which happens once the intake buffer is closed and drained.
pub struct WorkerPoolHandle {
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPoolHandle {
    /// Waits for all workers to exit.
    pub async fn join(self) {
        for worker in self.workers {
            if let Err(err) = worker.await {
                tracing::warn!(error = %err, "worker task panicked");
            }
        }
    }
}

/// Spawns `count` workers, each looping: take a packet, dispatch it, record
/// the outcome, repeat. A dispatch outcome never propagates as an error;
/// every packet leaves as `Delivered`, `Exhausted`, or `NoTargets`, all
/// terminal.
pub fn spawn(count: usize, buffer: IntakeBuffer, dispatcher: Arc<Dispatcher>, stats: Arc<Statistics>) -> WorkerPoolHandle {
    let workers = (0..count)
        .map(|worker_id| {
            let buffer = buffer.clone();
            let dispatcher = Arc::clone(&dispatcher);
            let stats = Arc::clone(&stats);
            tokio::spawn(async move { run_worker(worker_id, buffer, dispatcher, stats).await })
        })
        .collect();
    WorkerPoolHandle { workers }
}

async fn run_worker(worker_id: usize, buffer: IntakeBuffer, dispatcher: Arc<Dispatcher>, stats: Arc<Statistics>) {
    loop {
        let packet = match buffer.take().await {
            TakeOutcome::Packet(packet) => packet,
            TakeOutcome::Closed => {
                tracing::info!(worker_id, "worker exiting: intake buffer closed and drained");
                return;
            }
        };

        match dispatcher.dispatch(&packet).await {
            DispatchOutcome::Delivered { .. } => stats.record_delivered(),
            DispatchOutcome::Exhausted { .. } => stats.record_failed_exhausted(),
            DispatchOutcome::NoTargets => stats.record_no_targets(),
        }
    }
}
