//! Chat platform boundary
//!
//! The engine never speaks a wire protocol itself; everything it needs from
//! the host platform is expressed by the [`Platform`] trait. Production code
//! wires in a real client; tests and the demo use [`mock::MockPlatform`].

pub mod demo;
pub mod mock;
pub mod types;

pub use types::{
    ButtonSpec, ButtonStyle, ChannelId, ComponentEvent, ComponentLayout, LayoutRow,
    MenuOptionSpec, MenuSpec, MessageContent, MessageRef, PlatformError, UserId, UserRef,
};

use async_trait::async_trait;

/// Rendering and messaging capabilities consumed from the host platform
#[async_trait]
pub trait Platform: Send + Sync {
    /// Render content plus an interactive layout as a new message
    async fn send_message(
        &self,
        channel: ChannelId,
        content: &MessageContent,
        layout: &ComponentLayout,
    ) -> Result<MessageRef, PlatformError>;

    /// Replace the content of an existing message in place
    async fn edit_message(
        &self,
        message: &MessageRef,
        content: &MessageContent,
    ) -> Result<(), PlatformError>;

    /// Strip the interactive layout from an existing message
    async fn remove_layout(&self, message: &MessageRef) -> Result<(), PlatformError>;

    /// Delete an existing message
    async fn delete_message(&self, message: &MessageRef) -> Result<(), PlatformError>;

    /// Send a short notice visible to the user who triggered an event
    async fn notify_user(&self, event: &ComponentEvent, text: &str) -> Result<(), PlatformError>;
}
