//! Data types for the chat platform boundary

use serde::{Deserialize, Serialize};

/// Platform user identifier
pub type UserId = u64;

/// Platform channel identifier
pub type ChannelId = u64;

/// Handle to a message the platform has rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: ChannelId,
    pub message_id: u64,
}

/// Renderable message content (title, body, accent color)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    pub title: String,
    pub body: String,
    pub color: Option<u32>,
}

impl MessageContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }
}

/// Visual style of a button control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Danger,
}

/// Display metadata for one button control
///
/// `custom_id` is empty until the session builder stamps a generated opaque
/// id into it; callers only provide the visual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSpec {
    pub custom_id: String,
    pub label: String,
    pub emoji: Option<String>,
    pub style: ButtonStyle,
}

impl ButtonSpec {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            custom_id: String::new(),
            label: label.into(),
            emoji: None,
            style: ButtonStyle::Secondary,
        }
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn with_style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }
}

/// Display metadata for one selectable menu option
///
/// `value` is the option's opaque id, stamped by the session builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuOptionSpec {
    pub value: String,
    pub label: String,
    pub description: Option<String>,
}

impl MenuOptionSpec {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            label: label.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Display metadata for one select menu
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSpec {
    pub custom_id: String,
    pub placeholder: Option<String>,
    pub min_values: u8,
    pub max_values: u8,
    pub options: Vec<MenuOptionSpec>,
}

/// One rendered row of the interactive layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutRow {
    Buttons(Vec<ButtonSpec>),
    Menu(MenuSpec),
}

/// Interactive control layout attached to a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentLayout {
    pub rows: Vec<LayoutRow>,
}

impl ComponentLayout {
    /// All button specs in render order
    pub fn buttons(&self) -> Vec<&ButtonSpec> {
        self.rows
            .iter()
            .filter_map(|row| match row {
                LayoutRow::Buttons(buttons) => Some(buttons.iter()),
                LayoutRow::Menu(_) => None,
            })
            .flatten()
            .collect()
    }

    /// All menu specs in render order
    pub fn menus(&self) -> Vec<&MenuSpec> {
        self.rows
            .iter()
            .filter_map(|row| match row {
                LayoutRow::Menu(menu) => Some(menu),
                LayoutRow::Buttons(_) => None,
            })
            .collect()
    }
}

/// The user who activated a control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
}

impl UserRef {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Inbound "component activated" event delivered by the platform
///
/// Button activations carry the control id; menu activations carry the
/// menu's own id plus the list of selected option ids.
#[derive(Debug, Clone)]
pub struct ComponentEvent {
    pub control_id: String,
    pub values: Vec<String>,
    pub user: UserRef,
    pub message: MessageRef,
}

impl ComponentEvent {
    /// Event for a single button press
    pub fn button(control_id: impl Into<String>, user: UserRef, message: MessageRef) -> Self {
        Self {
            control_id: control_id.into(),
            values: Vec::new(),
            user,
            message,
        }
    }

    /// Event for a menu selection
    pub fn menu(
        menu_id: impl Into<String>,
        values: Vec<String>,
        user: UserRef,
        message: MessageRef,
    ) -> Self {
        Self {
            control_id: menu_id.into(),
            values,
            user,
            message,
        }
    }
}

/// Error types for platform operations
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Send error: {0}")]
    SendError(String),
    #[error("Edit error: {0}")]
    EditError(String),
    #[error("Message not found: {0:?}")]
    MessageNotFound(MessageRef),
    #[error("Platform connection closed")]
    Closed,
}
