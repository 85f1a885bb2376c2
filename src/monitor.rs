//! Per-agreement scheduler worker.
//!
//! Each channel agreement gets its own tokio task that runs
//! reconciliation cycles on a fixed cadence. Cycles are awaited before
//! the next tick fires, so at most one cycle per agreement is ever in
//! flight; a long wait-and-confirm delays the next cycle instead of
//! overlapping it. Independent agreements run on independent tasks.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::engine::Reconciler;
use crate::node::ChannelNode;
use crate::oracle::RateProvider;

/// Handle to a running monitor worker.
pub struct MonitorHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Signal shutdown and wait for the worker to finish. Cancels an
    /// in-progress confirmation wait promptly.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}

/// Spawn the reconciliation loop for one agreement.
///
/// `shutdown_tx` must be the sender paired with the receiver the
/// reconciler was built with. The first cycle runs immediately on the
/// worker task, keeping the caller's init path unblocked.
pub fn spawn<N, R>(
    mut reconciler: Reconciler<N, R>,
    cadence: Duration,
    shutdown_tx: watch::Sender<bool>,
) -> MonitorHandle
where
    N: ChannelNode + 'static,
    R: RateProvider + 'static,
{
    let mut shutdown_rx = shutdown_tx.subscribe();

    let task = tokio::spawn(async move {
        let channel_id = reconciler.agreement().channel_id.clone();
        info!(%channel_id, cadence_secs = cadence.as_secs(), "monitor started");

        let mut interval = tokio::time::interval(cadence);
        // A cycle that overruns the cadence delays the next tick rather
        // than bursting to catch up.
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = reconciler.run_cycle().await {
                        error!(%channel_id, error = %e, "cycle failed");
                    }
                }
                changed = shutdown_rx.changed() => {
                    let stop = match changed {
                        Ok(()) => *shutdown_rx.borrow(),
                        Err(_) => true,
                    };
                    if stop {
                        break;
                    }
                }
            }
        }

        info!(%channel_id, "monitor stopped");
    });

    MonitorHandle { shutdown_tx, task }
}
