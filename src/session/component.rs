//! Control descriptors and the typed reaction protocol
//!
//! A control is one interactive element (button or menu option) plus the
//! callback run when it is activated. Callbacks never apply side effects
//! themselves: they return a [`Reaction`] describing the state transition and
//! render work the dispatcher should carry out.

use std::fmt;
use std::sync::Arc;

use crate::platform::{ButtonSpec, ComponentEvent, MenuOptionSpec, MessageContent};

use super::context::{MenuContext, PaginationContext, SelectionContext};

/// Opaque control identifier, unique across all active sessions
pub type ControlId = String;

/// What a callback asks the dispatcher to do after it ran
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reaction {
    /// Commit this page index and re-render it (pagination contexts only)
    pub show_page: Option<usize>,
    /// Rewrite the originating message with this content
    pub edit: Option<MessageContent>,
    /// Tear the owning session down once all work for this event is done
    pub terminate: bool,
}

impl Reaction {
    /// No state change, no render, session stays live
    pub fn stay() -> Self {
        Self::default()
    }

    /// Navigate to `index` and re-render that page
    pub fn page(index: usize) -> Self {
        Self {
            show_page: Some(index),
            ..Self::default()
        }
    }

    /// Rewrite the originating message in place
    pub fn edit(content: MessageContent) -> Self {
        Self {
            edit: Some(content),
            ..Self::default()
        }
    }

    /// Terminate the owning session
    pub fn end() -> Self {
        Self {
            terminate: true,
            ..Self::default()
        }
    }
}

/// Error raised by a user-supplied callback
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Handler failed: {0}")]
    Failed(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type HandlerResult = Result<Reaction, HandlerError>;

pub type SelectionHandler =
    Arc<dyn Fn(&ComponentEvent, &SelectionContext, &str) -> HandlerResult + Send + Sync>;
pub type MenuHandler =
    Arc<dyn Fn(&ComponentEvent, &MenuContext, &str) -> HandlerResult + Send + Sync>;
pub type PaginationHandler =
    Arc<dyn Fn(&ComponentEvent, &PaginationContext, &str) -> HandlerResult + Send + Sync>;

/// One button in a selection row
#[derive(Clone)]
pub struct SelectionControl {
    pub button: ButtonSpec,
    pub callback: SelectionHandler,
}

/// One selectable option in a menu
#[derive(Clone)]
pub struct MenuOption {
    pub option: MenuOptionSpec,
    pub callback: MenuHandler,
}

/// One navigation button in a pagination row
#[derive(Clone)]
pub struct PageControl {
    pub button: ButtonSpec,
    pub callback: PaginationHandler,
}

impl fmt::Debug for SelectionControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionControl")
            .field("button", &self.button)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for MenuOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuOption")
            .field("option", &self.option)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for PageControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageControl")
            .field("button", &self.button)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_constructors() {
        assert_eq!(Reaction::stay(), Reaction::default());
        assert_eq!(Reaction::page(3).show_page, Some(3));
        assert!(Reaction::end().terminate);
        assert!(!Reaction::page(0).terminate);

        let edit = Reaction::edit(MessageContent::new("a", "b"));
        assert_eq!(edit.edit.unwrap().title, "a");
    }
}
