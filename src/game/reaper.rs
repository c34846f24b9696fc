//! Background sweep for games the engine never closed

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use super::GameRegistry;

/// Periodically drops games idle for longer than `max_idle`
pub struct Reaper {
    registry: Arc<GameRegistry>,
    max_idle: Duration,
    period: Duration,
}

impl Reaper {
    pub fn new(registry: Arc<GameRegistry>, max_idle: Duration, period: Duration) -> Self {
        Self {
            registry,
            max_idle,
            period,
        }
    }

    /// Run one sweep
    pub async fn sweep(&self) -> usize {
        let reaped = self.registry.reap_idle(self.max_idle).await;
        if !reaped.is_empty() {
            warn!(
                count = reaped.len(),
                games = ?reaped,
                max_idle_secs = self.max_idle.as_secs(),
                "Abandoned games reaped"
            );
        }
        reaped.len()
    }

    /// Sweep forever
    pub async fn run(self) {
        info!(
            max_idle_secs = self.max_idle.as_secs(),
            period_secs = self.period.as_secs(),
            "Idle game reaper started"
        );

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // first tick fires immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.sweep().await;
        }
    }
}
