//! Mock platform implementation
//! Used for tests and the demo walkthrough, where no real chat backend exists.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{
    ChannelId, ComponentEvent, ComponentLayout, MessageContent, MessageRef, PlatformError, UserId,
};
use super::Platform;

/// One message the mock platform has rendered
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub message: MessageRef,
    pub content: MessageContent,
    pub layout: ComponentLayout,
}

/// In-memory platform that records every call made against it
#[derive(Debug, Default)]
pub struct MockPlatform {
    next_message_id: AtomicU64,
    sent: Mutex<Vec<SentMessage>>,
    edits: Mutex<Vec<(MessageRef, MessageContent)>>,
    layout_removals: Mutex<Vec<MessageRef>>,
    deletions: Mutex<Vec<MessageRef>>,
    notices: Mutex<Vec<(UserId, String)>>,
}

impl MockPlatform {
    /// Create a new MockPlatform
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages sent so far
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    /// All in-place edits so far
    pub fn edits(&self) -> Vec<(MessageRef, MessageContent)> {
        self.edits.lock().clone()
    }

    /// All layout removals so far
    pub fn layout_removals(&self) -> Vec<MessageRef> {
        self.layout_removals.lock().clone()
    }

    /// All message deletions so far
    pub fn deletions(&self) -> Vec<MessageRef> {
        self.deletions.lock().clone()
    }

    /// All user notices so far
    pub fn notices(&self) -> Vec<(UserId, String)> {
        self.notices.lock().clone()
    }

    pub fn edit_count(&self) -> usize {
        self.edits.lock().len()
    }

    pub fn notice_count(&self) -> usize {
        self.notices.lock().len()
    }

    /// Content of the most recent edit, if any
    pub fn last_edit(&self) -> Option<MessageContent> {
        self.edits.lock().last().map(|(_, content)| content.clone())
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn send_message(
        &self,
        channel: ChannelId,
        content: &MessageContent,
        layout: &ComponentLayout,
    ) -> Result<MessageRef, PlatformError> {
        let message = MessageRef {
            channel_id: channel,
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1,
        };

        self.sent.lock().push(SentMessage {
            message,
            content: content.clone(),
            layout: layout.clone(),
        });

        Ok(message)
    }

    async fn edit_message(
        &self,
        message: &MessageRef,
        content: &MessageContent,
    ) -> Result<(), PlatformError> {
        self.edits.lock().push((*message, content.clone()));
        Ok(())
    }

    async fn remove_layout(&self, message: &MessageRef) -> Result<(), PlatformError> {
        self.layout_removals.lock().push(*message);
        Ok(())
    }

    async fn delete_message(&self, message: &MessageRef) -> Result<(), PlatformError> {
        self.deletions.lock().push(*message);
        Ok(())
    }

    async fn notify_user(&self, event: &ComponentEvent, text: &str) -> Result<(), PlatformError> {
        self.notices.lock().push((event.user.id, text.to_string()));
        Ok(())
    }
}
