//! Conversation Storage
//!
//! Capability interface for persisting conversation turns, plus an in-memory
//! implementation for development and tests.
//!
//! `load` and `append` are independent calls; nothing makes a turn's reads and
//! writes atomic. Two concurrent turns on one conversation may interleave their
//! appends, and the store's own ordering wins.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::message::{ConversationId, Message};

/// Conversation store trait for persistence
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Most recent `limit` messages, oldest first. Unknown conversations
    /// yield an empty list, not an error.
    async fn load(&self, id: &ConversationId, limit: usize) -> Result<Vec<Message>>;

    /// Append one message
    async fn append(&self, id: &ConversationId, message: &Message) -> Result<()>;
}

/// In-memory conversation store (for development/testing)
#[derive(Default)]
pub struct MemoryConversationStore {
    conversations: RwLock<HashMap<ConversationId, Vec<Message>>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total messages across all conversations
    pub async fn message_count(&self) -> usize {
        self.conversations.read().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn load(&self, id: &ConversationId, limit: usize) -> Result<Vec<Message>> {
        let conversations = self.conversations.read().await;
        let Some(messages) = conversations.get(id) else {
            return Ok(Vec::new());
        };
        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }

    async fn append(&self, id: &ConversationId, message: &Message) -> Result<()> {
        self.conversations
            .write()
            .await
            .entry(id.clone())
            .or_default()
            .push(message.clone());
        Ok(())
    }
}
