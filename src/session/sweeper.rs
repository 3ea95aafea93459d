//! Idle-session expiry
//!
//! A background sweep that periodically scans the registry for sessions
//! whose idle clock has run past their timeout. Expiry is delivered through
//! the session's own work queue, so it serializes with any in-flight events
//! for that session instead of racing them.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use super::registry::{epoch_ms, SessionRegistry, SessionWork};

/// Spawn the sweep loop over `registry` at the given interval
pub(crate) fn spawn(registry: Arc<SessionRegistry>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let idle = registry.idle_sessions(epoch_ms());
            if idle.is_empty() {
                continue;
            }

            debug!("Expiring {} idle sessions", idle.len());
            for (session_id, events_tx) in idle {
                if events_tx.send(SessionWork::Expire).is_err() {
                    debug!("Session {} already gone before expiry", session_id);
                }
            }
        }
    })
}
