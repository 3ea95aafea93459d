//! Session registry and handler index
//!
//! The single authoritative store of live sessions plus the reverse index
//! from opaque control id to the owning session and context. One explicitly
//! owned object, constructed once and shared by reference; all reads and
//! mutations serialize on an internal mutex that is never held across an
//! await, so registry calls are safe from any concurrent dispatch.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tracing::debug;

use crate::platform::{ComponentEvent, MessageRef};

use super::component::ControlId;
use super::context::{ContextKind, Session, SessionSnapshot};

/// Idle timeout applied when a session doesn't set its own
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(60);

/// Work items flowing through a session's serialized queue
#[derive(Debug)]
pub enum SessionWork {
    /// A button activation
    Control(ComponentEvent),
    /// A menu activation targeting the context at this index
    Menu(ComponentEvent, usize),
    /// Idle timeout fired
    Expire,
}

/// Reverse index entry: which session and context a control id belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerRef {
    pub session_id: String,
    pub context_index: usize,
    pub kind: ContextKind,
}

struct SessionEntry {
    state: Arc<Mutex<Session>>,
    events_tx: mpsc::UnboundedSender<SessionWork>,
    timeout: Duration,
    last_activity_ms: u64,
    message: Option<MessageRef>,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, SessionEntry>,
    handlers: HashMap<ControlId, HandlerRef>,
}

/// Registry of active sessions and their control handler index
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<Inner>,
}

pub(crate) fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a session and index every control it owns
    ///
    /// Fails without mutating anything if the session id is already live or
    /// any of its control ids collides with a registered one.
    pub fn register(
        &self,
        session: Session,
        events_tx: mpsc::UnboundedSender<SessionWork>,
    ) -> bool {
        let mut inner = self.inner.lock();

        if inner.sessions.contains_key(&session.id) {
            debug!("Rejecting duplicate session id {}", session.id);
            return false;
        }

        let controls = session.control_ids();
        if controls.iter().any(|(id, _)| inner.handlers.contains_key(id)) {
            debug!(
                "Rejecting session {} with a control id already in use",
                session.id
            );
            return false;
        }

        for (id, context_index) in &controls {
            inner.handlers.insert(
                id.clone(),
                HandlerRef {
                    session_id: session.id.clone(),
                    context_index: *context_index,
                    kind: session.contexts[*context_index].kind(),
                },
            );
        }

        let timeout = session.timeout.unwrap_or(DEFAULT_SESSION_TIMEOUT);
        let session_id = session.id.clone();
        inner.sessions.insert(
            session_id.clone(),
            SessionEntry {
                state: Arc::new(Mutex::new(session)),
                events_tx,
                timeout,
                last_activity_ms: epoch_ms(),
                message: None,
            },
        );

        debug!(
            "Registered session {} with {} controls",
            session_id,
            controls.len()
        );
        true
    }

    /// Remove a session and every handler index entry it owns
    ///
    /// The removal happens under one lock acquisition: no concurrent lookup
    /// can observe a half-torn-down session.
    pub fn unregister(&self, session_id: &str) -> bool {
        let mut inner = self.inner.lock();

        let Some(entry) = inner.sessions.remove(session_id) else {
            return false;
        };

        let controls = entry.state.lock().control_ids();
        for (id, _) in &controls {
            inner.handlers.remove(id);
        }

        debug!(
            "Unregistered session {} and {} controls",
            session_id,
            controls.len()
        );
        true
    }

    /// Resolve a control id to its owning session and context
    pub fn resolve(&self, control_id: &str) -> Option<HandlerRef> {
        self.inner.lock().handlers.get(control_id).cloned()
    }

    /// Queue sender for a session, refreshing its idle clock
    pub fn route(&self, session_id: &str) -> Option<mpsc::UnboundedSender<SessionWork>> {
        let mut inner = self.inner.lock();
        let entry = inner.sessions.get_mut(session_id)?;
        entry.last_activity_ms = epoch_ms();
        Some(entry.events_tx.clone())
    }

    /// Shared state handle for a session (used by its worker)
    pub(crate) fn state(&self, session_id: &str) -> Option<Arc<Mutex<Session>>> {
        self.inner
            .lock()
            .sessions
            .get(session_id)
            .map(|entry| Arc::clone(&entry.state))
    }

    /// Read-only view of a registered session
    pub fn snapshot(&self, session_id: &str) -> Option<SessionSnapshot> {
        let state = self.state(session_id)?;
        let session = state.lock();
        Some(SessionSnapshot::of(&session))
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.inner.lock().sessions.contains_key(session_id)
    }

    pub fn contains_control(&self, control_id: &str) -> bool {
        self.inner.lock().handlers.contains_key(control_id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().sessions.is_empty()
    }

    /// Number of live handler index entries across all sessions
    pub fn handler_count(&self) -> usize {
        self.inner.lock().handlers.len()
    }

    /// Ids of every live session
    pub fn session_ids(&self) -> Vec<String> {
        self.inner.lock().sessions.keys().cloned().collect()
    }

    /// Remember which rendered message carries this session's layout
    pub fn bind_message(&self, session_id: &str, message: MessageRef) -> bool {
        let mut inner = self.inner.lock();
        match inner.sessions.get_mut(session_id) {
            Some(entry) => {
                entry.message = Some(message);
                true
            }
            None => false,
        }
    }

    /// The message bound to this session, if any
    pub fn bound_message(&self, session_id: &str) -> Option<MessageRef> {
        self.inner
            .lock()
            .sessions
            .get(session_id)
            .and_then(|entry| entry.message)
    }

    /// Sessions whose idle clock has run past their timeout
    pub(crate) fn idle_sessions(
        &self,
        now_ms: u64,
    ) -> Vec<(String, mpsc::UnboundedSender<SessionWork>)> {
        self.inner
            .lock()
            .sessions
            .iter()
            .filter(|(_, entry)| {
                now_ms.saturating_sub(entry.last_activity_ms) > entry.timeout.as_millis() as u64
            })
            .map(|(id, entry)| (id.clone(), entry.events_tx.clone()))
            .collect()
    }
}
