use super::registry::MatchRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Periodically drop matches that have sat empty for longer than `ttl`.
/// Empty matches are kept until then so reconnecting players find their state.
pub fn spawn_reaper(
    registry: Arc<MatchRegistry>,
    ttl: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let removed = registry.reap_idle(ttl);
            if removed > 0 {
                info!(removed, remaining = registry.match_count(), "Reaped idle matches");
            } else {
                debug!(matches = registry.match_count(), "No idle matches to reap");
            }
        }
    })
}
