//! Periodic expired-refresh-token sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use agenda_auth::AuthService;

/// Spawns the background task that periodically deletes expired refresh
/// token records. Runs until the process exits; a failed sweep is logged
/// and retried on the next tick.
pub fn spawn_refresh_token_sweeper(
    service: Arc<AuthService>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; nothing can have expired yet.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match service.sweep_refresh_tokens().await {
                Ok(deleted) => debug!(deleted, "Refresh token sweep completed"),
                Err(e) => warn!(error = %e, "Refresh token sweep failed"),
            }
        }
    })
}
