//! Background task that writes debounced edits once they go quiet.

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, warn};
use wcp_services::SharedRegistry;

/// Polling period of the ticker.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// Owns the ticker task; dropping it stops the task.
pub struct AutoSaveTicker {
    handle: JoinHandle<()>,
}

impl AutoSaveTicker {
    pub fn spawn(registry: SharedRegistry, tick: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                flush_due(&registry);
            }
        });
        Self { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

fn flush_due(registry: &SharedRegistry) {
    let mut registry = registry.lock();
    let flushed = registry.flush_due(Instant::now());
    if flushed > 0 {
        debug!("Auto-saved {} file(s)", flushed);
        for w in registry.take_warnings() {
            warn!("Auto-save could not persist {}: {}", w.key, w.message);
        }
    }
}

impl Drop for AutoSaveTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
