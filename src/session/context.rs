//! Session state and context variants
//!
//! A session owns a set of context variants; each variant bundles the
//! controls that share one piece of state and one allowed-user rule. The
//! variants are a tagged union so every dispatch site matches exhaustively.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;

use crate::platform::{MessageContent, UserId};

use super::component::{ControlId, MenuOption, PageControl, SelectionControl};

/// Which variant a handler index entry points into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Selection,
    Menu,
    Pagination,
}

/// A row of buttons sharing one allowed-user rule
pub struct SelectionContext {
    pub session_id: String,
    pub buttons: Vec<SelectionControl>,
    pub allowed_users: HashSet<UserId>,
}

/// A select menu with per-option callbacks and the currently-selected set
pub struct MenuContext {
    pub session_id: String,
    pub options: Vec<MenuOption>,
    pub allowed_users: HashSet<UserId>,
    /// Option ids picked by the most recent menu activation
    pub selected: Vec<String>,
}

/// An ordered list of pages plus the navigation controls over them
pub struct PaginationContext {
    pub session_id: String,
    pub pages: Vec<MessageContent>,
    pub current_page: usize,
    pub buttons: Vec<PageControl>,
    pub allowed_users: HashSet<UserId>,
}

impl SelectionContext {
    /// An empty allowed set means the context is open to everyone
    pub fn allows(&self, user: UserId) -> bool {
        self.allowed_users.is_empty() || self.allowed_users.contains(&user)
    }
}

impl MenuContext {
    pub fn allows(&self, user: UserId) -> bool {
        self.allowed_users.is_empty() || self.allowed_users.contains(&user)
    }
}

impl PaginationContext {
    pub fn allows(&self, user: UserId) -> bool {
        self.allowed_users.is_empty() || self.allowed_users.contains(&user)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Index of the final page; 0 when there are no pages
    pub fn last_page(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }

    pub fn current_content(&self) -> Option<&MessageContent> {
        self.pages.get(self.current_page)
    }
}

/// Tagged union over the three context variants
pub enum ContextVariant {
    Selection(SelectionContext),
    Menu(MenuContext),
    Pagination(PaginationContext),
}

impl ContextVariant {
    pub fn kind(&self) -> ContextKind {
        match self {
            ContextVariant::Selection(_) => ContextKind::Selection,
            ContextVariant::Menu(_) => ContextKind::Menu,
            ContextVariant::Pagination(_) => ContextKind::Pagination,
        }
    }

    /// Opaque ids of every control this variant owns, in definition order
    pub fn control_ids(&self) -> Vec<ControlId> {
        match self {
            ContextVariant::Selection(ctx) => ctx
                .buttons
                .iter()
                .map(|control| control.button.custom_id.clone())
                .collect(),
            ContextVariant::Menu(ctx) => ctx
                .options
                .iter()
                .map(|option| option.option.value.clone())
                .collect(),
            ContextVariant::Pagination(ctx) => ctx
                .buttons
                .iter()
                .map(|control| control.button.custom_id.clone())
                .collect(),
        }
    }
}

/// One live instance of an interactive control layout
pub struct Session {
    /// Process-lifetime-unique session id
    pub id: String,
    /// Owned context variants; the builder guarantees at most one pagination
    pub contexts: Vec<ContextVariant>,
    pub created_at: DateTime<Utc>,
    /// Idle timeout; falls back to the engine default when unset
    pub timeout: Option<Duration>,
}

impl Session {
    /// Every (control id, owning context index) pair this session owns
    pub fn control_ids(&self) -> Vec<(ControlId, usize)> {
        self.contexts
            .iter()
            .enumerate()
            .flat_map(|(index, context)| {
                context
                    .control_ids()
                    .into_iter()
                    .map(move |id| (id, index))
            })
            .collect()
    }

    /// The pagination context, if this session has one
    pub fn pagination(&self) -> Option<&PaginationContext> {
        self.contexts.iter().find_map(|context| match context {
            ContextVariant::Pagination(ctx) => Some(ctx),
            _ => None,
        })
    }
}

/// Read-only view of a registered session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub id: String,
    pub context_count: usize,
    pub current_page: Option<usize>,
    pub selected_options: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub(crate) fn of(session: &Session) -> Self {
        let selected_options = session
            .contexts
            .iter()
            .find_map(|context| match context {
                ContextVariant::Menu(ctx) => Some(ctx.selected.clone()),
                _ => None,
            })
            .unwrap_or_default();

        Self {
            id: session.id.clone(),
            context_count: session.contexts.len(),
            current_page: session.pagination().map(|ctx| ctx.current_page),
            selected_options,
            created_at: session.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pagination(users: &[UserId], pages: usize) -> PaginationContext {
        PaginationContext {
            session_id: "s".to_string(),
            pages: (0..pages)
                .map(|i| MessageContent::new(format!("p{}", i), ""))
                .collect(),
            current_page: 0,
            buttons: Vec::new(),
            allowed_users: users.iter().copied().collect(),
        }
    }

    #[test]
    fn test_allows_membership() {
        let ctx = pagination(&[7, 8], 2);
        assert!(ctx.allows(7));
        assert!(!ctx.allows(9));
    }

    #[test]
    fn test_empty_allowed_set_is_open() {
        let ctx = pagination(&[], 2);
        assert!(ctx.allows(12345));
    }

    #[test]
    fn test_last_page_of_empty_pagination() {
        let ctx = pagination(&[], 0);
        assert_eq!(ctx.last_page(), 0);
        assert!(ctx.current_content().is_none());
    }

    #[test]
    fn test_snapshot_reports_current_page() {
        let session = Session {
            id: "abc".to_string(),
            contexts: vec![ContextVariant::Pagination(pagination(&[], 3))],
            created_at: Utc::now(),
            timeout: None,
        };

        let snapshot = SessionSnapshot::of(&session);
        assert_eq!(snapshot.id, "abc");
        assert_eq!(snapshot.current_page, Some(0));
        assert!(snapshot.selected_options.is_empty());
    }
}
