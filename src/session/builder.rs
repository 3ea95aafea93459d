//! Fluent builders for sessions and their context variants
//!
//! A session is assembled from per-variant sub-builders, then `build()`
//! assigns a fresh session id, stamps a generated opaque id into every
//! control, and returns the session together with its renderable layout.
//! Building never registers: callers can still abort before a session
//! becomes visible to inbound events.

use chrono::Utc;
use std::collections::HashSet;
use std::time::Duration;
use uuid::Uuid;

use crate::platform::{
    ButtonSpec, ButtonStyle, ComponentLayout, LayoutRow, MenuOptionSpec, MenuSpec, MessageContent,
    UserId,
};

use super::completion::Completion;
use super::component::{
    ControlId, MenuHandler, MenuOption, PageControl, PaginationHandler, Reaction, SelectionControl,
    SelectionHandler,
};
use super::context::{
    ContextVariant, MenuContext, PaginationContext, Session, SelectionContext,
};

/// Error types for session assembly
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Duplicate control id in session layout: {0}")]
    DuplicateControlId(ControlId),
}

/// Navigation actions understood by the default pagination buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    First,
    Previous,
    Next,
    Last,
    Stop,
}

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builder for a row of buttons resolving a caller-side decision
#[derive(Default)]
pub struct SelectionBuilder {
    buttons: Vec<SelectionControl>,
    allowed_users: HashSet<UserId>,
}

impl SelectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict activation handling to `user` (additive)
    pub fn with_user(mut self, user: UserId) -> Self {
        self.allowed_users.insert(user);
        self
    }

    pub fn with_users(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        self.allowed_users.extend(users);
        self
    }

    /// Add a button and the callback run when it is pressed
    pub fn with_button<F>(mut self, button: ButtonSpec, handler: F) -> Self
    where
        F: Fn(
                &crate::platform::ComponentEvent,
                &SelectionContext,
                &str,
            ) -> Result<Reaction, super::component::HandlerError>
            + Send
            + Sync
            + 'static,
    {
        self.buttons.push(SelectionControl {
            button,
            callback: std::sync::Arc::new(handler) as SelectionHandler,
        });
        self
    }

    /// The standard two-button confirm/cancel pair
    ///
    /// Both callbacks resolve `done` and terminate the session; the engine
    /// itself knows nothing about which button means what.
    pub fn confirm_cancel(yes: ButtonSpec, no: ButtonSpec, done: &Completion<bool>) -> Self {
        let confirm = done.clone();
        let cancel = done.clone();

        Self::new()
            .with_button(yes, move |_event, _context, _id| {
                confirm.resolve(true);
                Ok(Reaction::end())
            })
            .with_button(no, move |_event, _context, _id| {
                cancel.resolve(false);
                Ok(Reaction::end())
            })
    }

    fn build(self, session_id: &str) -> (SelectionContext, Vec<ButtonSpec>) {
        let mut context = SelectionContext {
            session_id: session_id.to_string(),
            buttons: self.buttons,
            allowed_users: self.allowed_users,
        };

        for control in &mut context.buttons {
            control.button.custom_id = fresh_id();
        }

        let specs = context
            .buttons
            .iter()
            .map(|control| control.button.clone())
            .collect();

        (context, specs)
    }
}

/// Builder for a select menu with per-option callbacks
#[derive(Default)]
pub struct MenuBuilder {
    placeholder: Option<String>,
    min_values: u8,
    max_values: u8,
    options: Vec<MenuOption>,
    allowed_users: HashSet<UserId>,
}

impl MenuBuilder {
    pub fn new() -> Self {
        Self {
            max_values: 1,
            ..Self::default()
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Selection bounds shown to the platform (min..=max options per event)
    pub fn with_value_bounds(mut self, min_values: u8, max_values: u8) -> Self {
        self.min_values = min_values;
        self.max_values = max_values;
        self
    }

    pub fn with_user(mut self, user: UserId) -> Self {
        self.allowed_users.insert(user);
        self
    }

    pub fn with_users(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        self.allowed_users.extend(users);
        self
    }

    /// Add an option and the callback run when it is part of a selection
    pub fn with_option<F>(mut self, option: MenuOptionSpec, handler: F) -> Self
    where
        F: Fn(
                &crate::platform::ComponentEvent,
                &MenuContext,
                &str,
            ) -> Result<Reaction, super::component::HandlerError>
            + Send
            + Sync
            + 'static,
    {
        self.options.push(MenuOption {
            option,
            callback: std::sync::Arc::new(handler) as MenuHandler,
        });
        self
    }

    fn build(self, session_id: &str) -> (MenuContext, MenuSpec) {
        let mut context = MenuContext {
            session_id: session_id.to_string(),
            options: self.options,
            allowed_users: self.allowed_users,
            selected: Vec::new(),
        };

        for option in &mut context.options {
            option.option.value = fresh_id();
        }

        let spec = MenuSpec {
            custom_id: fresh_id(),
            placeholder: self.placeholder,
            min_values: self.min_values,
            max_values: self.max_values.max(1),
            options: context
                .options
                .iter()
                .map(|option| option.option.clone())
                .collect(),
        };

        (context, spec)
    }
}

/// Builder for a paginated reader
#[derive(Default)]
pub struct PaginationBuilder {
    pages: Vec<MessageContent>,
    buttons: Vec<PageControl>,
    allowed_users: HashSet<UserId>,
}

impl PaginationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(mut self, pages: impl IntoIterator<Item = MessageContent>) -> Self {
        self.pages = pages.into_iter().collect();
        self
    }

    pub fn with_user(mut self, user: UserId) -> Self {
        self.allowed_users.insert(user);
        self
    }

    pub fn with_users(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        self.allowed_users.extend(users);
        self
    }

    /// The standard five-button navigation row
    pub fn with_default_buttons(self) -> Self {
        self.with_button(
            ButtonSpec::labeled("").with_emoji("⏮️"),
            PageAction::First,
        )
        .with_button(
            ButtonSpec::labeled("").with_emoji("⏪"),
            PageAction::Previous,
        )
        .with_button(ButtonSpec::labeled("").with_emoji("⏩"), PageAction::Next)
        .with_button(ButtonSpec::labeled("").with_emoji("⏭️"), PageAction::Last)
        .with_button(
            ButtonSpec::labeled("")
                .with_emoji("🛑")
                .with_style(ButtonStyle::Danger),
            PageAction::Stop,
        )
    }

    /// Add a navigation button bound to one of the standard actions
    pub fn with_button(mut self, button: ButtonSpec, action: PageAction) -> Self {
        self.buttons.push(PageControl {
            button,
            callback: page_handler(action),
        });
        self
    }

    /// Add a navigation button with a caller-supplied callback
    pub fn with_custom_button<F>(mut self, button: ButtonSpec, handler: F) -> Self
    where
        F: Fn(
                &crate::platform::ComponentEvent,
                &PaginationContext,
                &str,
            ) -> Result<Reaction, super::component::HandlerError>
            + Send
            + Sync
            + 'static,
    {
        self.buttons.push(PageControl {
            button,
            callback: std::sync::Arc::new(handler) as PaginationHandler,
        });
        self
    }

    fn build(self, session_id: &str) -> (PaginationContext, Vec<ButtonSpec>) {
        let mut context = PaginationContext {
            session_id: session_id.to_string(),
            pages: self.pages,
            current_page: 0,
            buttons: self.buttons,
            allowed_users: self.allowed_users,
        };

        for control in &mut context.buttons {
            control.button.custom_id = fresh_id();
        }

        let specs = context
            .buttons
            .iter()
            .map(|control| control.button.clone())
            .collect();

        (context, specs)
    }
}

/// Authorization-gated state transition for one standard navigation action
///
/// An unauthorized click is a silent no-op: the callback reports no work and
/// the dispatcher gives no visible feedback.
fn page_handler(action: PageAction) -> PaginationHandler {
    std::sync::Arc::new(move |event, context, _id| {
        if !context.allows(event.user.id) {
            return Ok(Reaction::stay());
        }

        Ok(match action {
            PageAction::First => Reaction::page(0),
            PageAction::Previous => Reaction::page(context.current_page.saturating_sub(1)),
            PageAction::Next => Reaction::page((context.current_page + 1).min(context.last_page())),
            PageAction::Last => Reaction::page(context.last_page()),
            PageAction::Stop => Reaction::end(),
        })
    })
}

/// A built session plus everything the caller needs to render it
pub struct BuiltSession {
    pub session: Session,
    pub layout: ComponentLayout,
    /// First pagination page, when the session has a pagination context
    pub initial_page: Option<MessageContent>,
}

/// Accumulates context variants into one session
#[derive(Default)]
pub struct SessionBuilder {
    selections: Vec<SelectionBuilder>,
    menus: Vec<MenuBuilder>,
    pagination: Option<PaginationBuilder>,
    timeout: Option<Duration>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_selection(mut self, builder: SelectionBuilder) -> Self {
        self.selections.push(builder);
        self
    }

    pub fn add_menu(mut self, builder: MenuBuilder) -> Self {
        self.menus.push(builder);
        self
    }

    /// Attach a pagination context; a second call replaces the first
    pub fn with_pagination(mut self, builder: PaginationBuilder) -> Self {
        self.pagination = Some(builder);
        self
    }

    /// Idle timeout for this session, overriding the engine default
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Assemble the session, assigning the session id and all control ids
    pub fn build(self) -> Result<BuiltSession, BuildError> {
        let session_id = fresh_id();
        let mut contexts = Vec::new();
        let mut layout = ComponentLayout::default();

        for builder in self.selections {
            let (context, specs) = builder.build(&session_id);
            contexts.push(ContextVariant::Selection(context));
            layout.rows.push(LayoutRow::Buttons(specs));
        }

        for builder in self.menus {
            let (context, spec) = builder.build(&session_id);
            contexts.push(ContextVariant::Menu(context));
            layout.rows.push(LayoutRow::Menu(spec));
        }

        let mut initial_page = None;
        if let Some(builder) = self.pagination {
            let (context, specs) = builder.build(&session_id);
            initial_page = context.pages.first().cloned();
            contexts.push(ContextVariant::Pagination(context));
            layout.rows.push(LayoutRow::Buttons(specs));
        }

        let session = Session {
            id: session_id,
            contexts,
            created_at: Utc::now(),
            timeout: self.timeout,
        };

        check_unique(session.control_ids().into_iter().map(|(id, _)| id))?;

        Ok(BuiltSession {
            session,
            layout,
            initial_page,
        })
    }
}

/// Defensive duplicate check over the generated control ids
fn check_unique(ids: impl IntoIterator<Item = ControlId>) -> Result<(), BuildError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.clone()) {
            return Err(BuildError::DuplicateControlId(id));
        }
    }
    Ok(())
}
