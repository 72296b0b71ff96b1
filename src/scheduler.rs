use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

/// Once per day of wall-clock time.
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeTick;

/// Fires a [`PurgeTick`] on a fixed interval. The owner of the task collection
/// receives ticks and runs the purge itself, so the timer never touches state.
/// Dropping the scheduler stops the timer.
pub struct PurgeScheduler {
    handle: JoinHandle<()>,
    ticks: mpsc::Receiver<PurgeTick>,
}

impl PurgeScheduler {
    /// Must be called from within a tokio runtime. The first tick arrives one full
    /// `period` after start; startup runs its own purge.
    pub fn start(period: Duration) -> Self {
        let (tx, ticks) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            let first = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(first, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                match tx.try_send(PurgeTick) {
                    // A tick still waiting in the channel already covers this one.
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Closed(_)) => break,
                }
            }
        });
        log::debug!("scheduler: purge timer started period_secs={}", period.as_secs());
        Self { handle, ticks }
    }

    /// Resolves on the next tick, or `None` once the timer has been shut down.
    pub async fn next_tick(&mut self) -> Option<PurgeTick> {
        self.ticks.recv().await
    }

    pub fn shutdown(&self) {
        if !self.handle.is_finished() {
            self.handle.abort();
            log::debug!("scheduler: purge timer stopped");
        }
    }
}

impl Drop for PurgeScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
