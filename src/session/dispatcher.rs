//! Event dispatch and session lifecycle
//!
//! The dispatcher is the engine facade: it registers built sessions
//! (spawning one worker task per session), takes inbound "component
//! activated" events from the host's event loop, resolves their opaque ids
//! through the registry, and hands the work to the owning session's queue.
//!
//! Intake never blocks: resolving and enqueueing are the only work done on
//! the caller's path, so the platform event loop stays free to accept the
//! next inbound event. Events for different sessions run concurrently;
//! events for the same session are processed strictly in arrival order by
//! its worker, which makes teardown linearizable.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::metrics::{DispatchStats, StatsSnapshot};
use crate::platform::{ComponentEvent, MessageContent, MessageRef, Platform};

use super::component::Reaction;
use super::context::{ContextKind, ContextVariant, Session, SessionSnapshot};
use super::registry::{SessionRegistry, SessionWork};
use super::sweeper;

const UNKNOWN_CONTROL_NOTICE: &str = "Unknown control.";
const UNKNOWN_OPTION_NOTICE: &str = "Unknown option.";

/// Engine tuning derived from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Idle timeout for sessions that don't set their own
    pub default_timeout: Duration,
    /// Interval between idle-session sweeps
    pub sweep_interval: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(1),
        }
    }
}

/// Resolves inbound activation events to callbacks and applies the results
pub struct Dispatcher {
    registry: Arc<SessionRegistry>,
    platform: Arc<dyn Platform>,
    stats: Arc<DispatchStats>,
    settings: SessionSettings,
}

impl Dispatcher {
    /// Create a dispatcher over the given platform
    pub fn new(platform: Arc<dyn Platform>, settings: SessionSettings) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            platform,
            stats: Arc::new(DispatchStats::new()),
            settings,
        }
    }

    /// Make a built session live and spawn its worker
    ///
    /// Returns false (and spawns nothing) when the registry rejects the
    /// session; the caller must not treat the session as live.
    pub fn register(&self, mut session: Session) -> bool {
        if session.timeout.is_none() {
            session.timeout = Some(self.settings.default_timeout);
        }

        let session_id = session.id.clone();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        if !self.registry.register(session, events_tx) {
            warn!("Session {} was rejected by the registry", session_id);
            return false;
        }
        self.stats.record_session_registered();

        let Some(state) = self.registry.state(&session_id) else {
            // Unregistered between the two calls; nothing left to run.
            return false;
        };

        let worker = SessionWorker {
            session_id: session_id.clone(),
            state,
            registry: Arc::clone(&self.registry),
            platform: Arc::clone(&self.platform),
            stats: Arc::clone(&self.stats),
        };
        tokio::spawn(worker.run(events_rx));

        info!("Session {} is live", session_id);
        true
    }

    /// Tear down a session by id
    pub fn unregister(&self, session_id: &str) -> bool {
        let removed = self.registry.unregister(session_id);
        if removed {
            self.stats.record_session_removed();
        }
        removed
    }

    /// Remember which rendered message carries this session's layout
    pub fn bind_message(&self, session_id: &str, message: MessageRef) -> bool {
        self.registry.bind_message(session_id, message)
    }

    /// Entry point for inbound button activations
    ///
    /// Non-blocking: resolves the id and enqueues on the owning session's
    /// queue. Unknown ids get a generic rejection and touch no session.
    pub fn on_control_activated(&self, event: ComponentEvent) {
        let Some(handler) = self.registry.resolve(&event.control_id) else {
            debug!("No handler registered for control {}", event.control_id);
            self.reject(event, UNKNOWN_CONTROL_NOTICE);
            return;
        };

        // Menu options are only reachable through menu activations.
        if handler.kind == ContextKind::Menu {
            self.reject(event, UNKNOWN_CONTROL_NOTICE);
            return;
        }

        match self.registry.route(&handler.session_id) {
            Some(tx) => {
                if tx.send(SessionWork::Control(event)).is_err() {
                    debug!("Worker for session {} already gone", handler.session_id);
                }
            }
            None => self.reject(event, UNKNOWN_CONTROL_NOTICE),
        }
    }

    /// Entry point for inbound menu activations
    ///
    /// The event carries the set of selected option ids. All of them must
    /// resolve to registered menu options, or the whole event is rejected
    /// before any callback runs.
    pub fn on_menu_activated(&self, event: ComponentEvent) {
        if event.values.is_empty() {
            debug!("Menu activation without selected options ignored");
            return;
        }

        let mut target = None;
        let mut unknown = None;
        for value in &event.values {
            match self.registry.resolve(value) {
                Some(handler) if handler.kind == ContextKind::Menu => {
                    target.get_or_insert(handler);
                }
                _ => {
                    unknown = Some(value.clone());
                    break;
                }
            }
        }

        if let Some(value) = unknown {
            debug!("Menu activation carries unknown option {}", value);
            self.reject(event, UNKNOWN_OPTION_NOTICE);
            return;
        }

        // All ids resolved; dispatch to the menu owning the first one.
        let Some(handler) = target else { return };
        match self.registry.route(&handler.session_id) {
            Some(tx) => {
                let work = SessionWork::Menu(event, handler.context_index);
                if tx.send(work).is_err() {
                    debug!("Worker for session {} already gone", handler.session_id);
                }
            }
            None => self.reject(event, UNKNOWN_OPTION_NOTICE),
        }
    }

    /// Start the idle-session sweep over this dispatcher's registry
    pub fn spawn_idle_sweeper(&self) -> JoinHandle<()> {
        sweeper::spawn(Arc::clone(&self.registry), self.settings.sweep_interval)
    }

    /// Tear down every live session, stripping bound layouts concurrently
    pub async fn shutdown(&self) {
        use futures_util::stream::{FuturesUnordered, StreamExt};

        let sessions = self.registry.session_ids();
        if sessions.is_empty() {
            return;
        }
        info!("Shutting down {} live sessions", sessions.len());

        let mut strips = FuturesUnordered::new();
        for session_id in &sessions {
            if let Some(message) = self.registry.bound_message(session_id) {
                let platform = Arc::clone(&self.platform);
                strips.push(async move {
                    if let Err(e) = platform.remove_layout(&message).await {
                        warn!("Failed to strip layout during shutdown: {}", e);
                    }
                });
            }
        }
        while strips.next().await.is_some() {}

        for session_id in &sessions {
            self.unregister(session_id);
        }
    }

    /// Read-only view of a live session
    pub fn snapshot(&self, session_id: &str) -> Option<SessionSnapshot> {
        self.registry.snapshot(session_id)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.registry.contains(session_id)
    }

    pub fn contains_control(&self, control_id: &str) -> bool {
        self.registry.contains_control(control_id)
    }

    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    pub fn handler_count(&self) -> usize {
        self.registry.handler_count()
    }

    /// Point-in-time dispatch counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn reject(&self, event: ComponentEvent, notice: &'static str) {
        self.stats.record_unknown_control();
        let platform = Arc::clone(&self.platform);
        tokio::spawn(async move {
            if let Err(e) = platform.notify_user(&event, notice).await {
                debug!("Failed to deliver rejection notice: {}", e);
            }
        });
    }
}

/// Per-session worker: processes this session's events one at a time
struct SessionWorker {
    session_id: String,
    state: Arc<Mutex<Session>>,
    registry: Arc<SessionRegistry>,
    platform: Arc<dyn Platform>,
    stats: Arc<DispatchStats>,
}

/// State transition computed under the session lock, applied after it
#[derive(Default)]
struct Outcome {
    renders: Vec<MessageContent>,
    terminate: bool,
}

impl SessionWorker {
    async fn run(self, mut events_rx: mpsc::UnboundedReceiver<SessionWork>) {
        let mut terminated = false;

        while let Some(work) = events_rx.recv().await {
            if terminated {
                // Queued behind the teardown event; the session is gone.
                if let SessionWork::Control(event) | SessionWork::Menu(event, _) = work {
                    self.notify(&event, UNKNOWN_CONTROL_NOTICE).await;
                }
                continue;
            }

            terminated = match work {
                SessionWork::Control(event) => self.handle_control(event).await,
                SessionWork::Menu(event, context_index) => {
                    self.handle_menu(event, context_index).await
                }
                SessionWork::Expire => {
                    self.expire().await;
                    true
                }
            };
        }

        debug!("Worker for session {} finished", self.session_id);
    }

    /// Run one button activation to completion; returns true on teardown
    async fn handle_control(&self, event: ComponentEvent) -> bool {
        let Some(handler) = self.registry.resolve(&event.control_id) else {
            // Torn down between intake and processing.
            self.notify(&event, UNKNOWN_CONTROL_NOTICE).await;
            return false;
        };

        self.stats.record_event_processed();

        let outcome = {
            let mut session = self.state.lock();
            let Some(context) = session.contexts.get_mut(handler.context_index) else {
                return false;
            };

            match context {
                ContextVariant::Selection(ctx) => {
                    let Some(control) = ctx
                        .buttons
                        .iter()
                        .find(|control| control.button.custom_id == event.control_id)
                    else {
                        return false;
                    };
                    let callback = Arc::clone(&control.callback);
                    match callback(&event, ctx, &event.control_id) {
                        Ok(reaction) => self.apply_plain(reaction),
                        Err(e) => {
                            error!("Selection handler failed for {}: {}", event.control_id, e);
                            self.stats.record_handler_error();
                            Outcome::default()
                        }
                    }
                }
                ContextVariant::Pagination(ctx) => {
                    let Some(control) = ctx
                        .buttons
                        .iter()
                        .find(|control| control.button.custom_id == event.control_id)
                    else {
                        return false;
                    };
                    let callback = Arc::clone(&control.callback);
                    match callback(&event, ctx, &event.control_id) {
                        Ok(reaction) => {
                            let mut outcome = self.apply_plain(reaction.clone());
                            if let Some(page) = reaction.show_page {
                                // Commit the transition, clamped into bounds
                                let page = page.min(ctx.last_page());
                                ctx.current_page = page;
                                if let Some(content) = ctx.pages.get(page) {
                                    outcome.renders.push(content.clone());
                                }
                            }
                            outcome
                        }
                        Err(e) => {
                            error!("Pagination handler failed for {}: {}", event.control_id, e);
                            self.stats.record_handler_error();
                            Outcome::default()
                        }
                    }
                }
                // Menu options never arrive through button activations;
                // intake filters them out before routing.
                ContextVariant::Menu(_) => Outcome::default(),
            }
        };

        self.finish(event, outcome).await
    }

    /// Run one menu activation to completion; returns true on teardown
    async fn handle_menu(&self, event: ComponentEvent, context_index: usize) -> bool {
        self.stats.record_event_processed();

        let outcome = {
            let mut session = self.state.lock();
            let Some(ContextVariant::Menu(ctx)) = session.contexts.get_mut(context_index) else {
                return false;
            };

            // Record the activated set before any callback observes it
            ctx.selected = event.values.clone();

            let mut outcome = Outcome::default();
            for option in &ctx.options {
                if !event.values.contains(&option.option.value) {
                    continue;
                }

                let callback = Arc::clone(&option.callback);
                match callback(&event, ctx, &option.option.value) {
                    Ok(reaction) => {
                        if let Some(content) = reaction.edit {
                            outcome.renders.push(content);
                        }
                        // Any terminating option tears the whole session
                        // down, but only after every selected callback ran.
                        outcome.terminate |= reaction.terminate;
                    }
                    Err(e) => {
                        error!(
                            "Menu handler failed for option {}: {}",
                            option.option.value, e
                        );
                        self.stats.record_handler_error();
                    }
                }
            }
            outcome
        };

        self.finish(event, outcome).await
    }

    /// Side effects of a selection/menu reaction (no page transition)
    fn apply_plain(&self, reaction: Reaction) -> Outcome {
        let mut outcome = Outcome {
            terminate: reaction.terminate,
            ..Outcome::default()
        };
        if let Some(content) = reaction.edit {
            outcome.renders.push(content);
        }
        outcome
    }

    /// Apply the computed outcome: renders first, then teardown
    async fn finish(&self, event: ComponentEvent, outcome: Outcome) -> bool {
        for content in &outcome.renders {
            if let Err(e) = self.platform.edit_message(&event.message, content).await {
                warn!(
                    "Failed to edit message for session {}: {}",
                    self.session_id, e
                );
            }
        }

        if outcome.terminate {
            self.teardown(Some(&event.message)).await;
            return true;
        }
        false
    }

    /// Idle timeout fired for this session
    async fn expire(&self) {
        info!("Session {} expired after idle timeout", self.session_id);
        self.stats.record_session_expired();

        let message = self.registry.bound_message(&self.session_id);
        self.teardown(message.as_ref()).await;
    }

    /// Strip the interactive layout, then remove the session atomically
    async fn teardown(&self, message: Option<&MessageRef>) {
        if let Some(message) = message {
            if let Err(e) = self.platform.remove_layout(message).await {
                warn!(
                    "Failed to strip layout for session {}: {}",
                    self.session_id, e
                );
            }
        }

        if self.registry.unregister(&self.session_id) {
            self.stats.record_session_removed();
        }
    }

    async fn notify(&self, event: &ComponentEvent, text: &str) {
        if let Err(e) = self.platform.notify_user(event, text).await {
            debug!("Failed to deliver notice: {}", e);
        }
    }
}
