use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Conversation-scoped values that survive between turns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    #[serde(default)]
    pub conversation: ConversationScope,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationScope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl ConversationState {
    /// Bumps the message counter, treating a missing value as zero.
    pub fn increment_count(&mut self) -> u64 {
        let next = self.count().saturating_add(1);
        self.conversation.count = Some(next);
        next
    }

    pub fn count(&self) -> u64 {
        self.conversation.count.unwrap_or(0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateStoreError {
    #[error("state store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ConversationStateStore: Send + Sync {
    /// Returns the stored state, or the default when nothing is stored.
    async fn load(&self, conversation_id: &str) -> Result<ConversationState, StateStoreError>;
    async fn save(
        &self,
        conversation_id: &str,
        state: ConversationState,
    ) -> Result<(), StateStoreError>;
    async fn delete(&self, conversation_id: &str) -> Result<(), StateStoreError>;
}

/// Process-local store. State is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: RwLock<HashMap<String, ConversationState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn conversation_count(&self) -> usize {
        self.states.read().await.len()
    }
}

#[async_trait]
impl ConversationStateStore for MemoryStateStore {
    async fn load(&self, conversation_id: &str) -> Result<ConversationState, StateStoreError> {
        Ok(self.states.read().await.get(conversation_id).cloned().unwrap_or_default())
    }

    async fn save(
        &self,
        conversation_id: &str,
        state: ConversationState,
    ) -> Result<(), StateStoreError> {
        self.states.write().await.insert(conversation_id.to_owned(), state);
        Ok(())
    }

    async fn delete(&self, conversation_id: &str) -> Result<(), StateStoreError> {
        self.states.write().await.remove(conversation_id);
        Ok(())
    }
}
