//! Metrics collection for the session engine
//!
//! Tracks dispatch volume, rejections, and session lifecycle counts.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters shared by the dispatcher and its session workers
#[derive(Debug, Default)]
pub struct DispatchStats {
    sessions_registered: AtomicU64,
    sessions_removed: AtomicU64,
    sessions_expired: AtomicU64,
    events_processed: AtomicU64,
    unknown_controls: AtomicU64,
    handler_errors: AtomicU64,
}

impl DispatchStats {
    /// Create a zeroed counter set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_session_registered(&self) {
        self.sessions_registered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_removed(&self) {
        self.sessions_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_expired(&self) {
        self.sessions_expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_processed(&self) {
        self.events_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unknown_control(&self) {
        self.unknown_controls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_handler_error(&self) {
        self.handler_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            sessions_registered: self.sessions_registered.load(Ordering::Relaxed),
            sessions_removed: self.sessions_removed.load(Ordering::Relaxed),
            sessions_expired: self.sessions_expired.load(Ordering::Relaxed),
            events_processed: self.events_processed.load(Ordering::Relaxed),
            unknown_controls: self.unknown_controls.load(Ordering::Relaxed),
            handler_errors: self.handler_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the dispatch counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub sessions_registered: u64,
    pub sessions_removed: u64,
    pub sessions_expired: u64,
    pub events_processed: u64,
    pub unknown_controls: u64,
    pub handler_errors: u64,
}
