// src/poller/handle.rs
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

/// Control over a running poll schedule.
///
/// Dropping the handle detaches the schedule; it then runs until the
/// runtime shuts down. Stopping never cancels polls already in flight.
#[derive(Debug)]
pub struct PollerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub(crate) fn new(shutdown_tx: watch::Sender<bool>, task: JoinHandle<()>) -> Self {
        Self { shutdown_tx, task }
    }

    /// Ask the schedule to stop before its next tick.
    pub fn stop(&self) {
        self.shutdown_tx.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop and wait for the scheduling task to exit.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        self.stop();
        self.task.await
    }
}

/// Resolves when a stop was requested. A dropped handle is not a stop.
pub(crate) async fn stop_requested(rx: &mut watch::Receiver<bool>) {
    let requested = rx.wait_for(|stop| *stop).await.is_ok();
    if !requested {
        std::future::pending::<()>().await;
    }
}
