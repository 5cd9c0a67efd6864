use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    activity::{Activity, OutboundActivity},
    state::{ConversationState, StateStoreError},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplyError {
    #[error("reply channel closed")]
    Closed,
    #[error("reply delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("activity has no conversation id")]
    MissingConversation,
    #[error(transparent)]
    Reply(#[from] ReplyError),
    #[error(transparent)]
    State(#[from] StateStoreError),
    #[error("failed to serialize reply payload: {0}")]
    Serialize(String),
}

/// Destination for the activities a turn produces.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, activity: OutboundActivity) -> Result<(), ReplyError>;
}

/// Collects replies in memory; the HTTP surface returns them in the response
/// body once the turn completes.
#[derive(Default)]
pub struct BufferedReplySink {
    sent: Mutex<Vec<OutboundActivity>>,
}

impl BufferedReplySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn take(&self) -> Vec<OutboundActivity> {
        std::mem::take(&mut *self.sent.lock().await)
    }

    pub async fn texts(&self) -> Vec<String> {
        self.sent.lock().await.iter().map(|reply| reply.text_content().to_owned()).collect()
    }

    pub async fn len(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sent.lock().await.is_empty()
    }
}

#[async_trait]
impl ReplySink for BufferedReplySink {
    async fn send(&self, activity: OutboundActivity) -> Result<(), ReplyError> {
        self.sent.lock().await.push(activity);
        Ok(())
    }
}

/// Everything a handler sees during one turn.
pub struct TurnContext<'a> {
    activity: &'a Activity,
    state: &'a mut ConversationState,
    sink: &'a dyn ReplySink,
    correlation_id: &'a str,
    state_cleared: bool,
    replies_sent: usize,
}

impl<'a> TurnContext<'a> {
    pub fn new(
        activity: &'a Activity,
        state: &'a mut ConversationState,
        sink: &'a dyn ReplySink,
        correlation_id: &'a str,
    ) -> Self {
        Self { activity, state, sink, correlation_id, state_cleared: false, replies_sent: 0 }
    }

    pub fn activity(&self) -> &Activity {
        self.activity
    }

    pub fn correlation_id(&self) -> &str {
        self.correlation_id
    }

    pub fn state(&self) -> &ConversationState {
        self.state
    }

    pub fn state_mut(&mut self) -> &mut ConversationState {
        self.state
    }

    /// Drops all conversation state; the store entry is deleted after the turn.
    pub fn clear_state(&mut self) {
        *self.state = ConversationState::default();
        self.state_cleared = true;
    }

    pub fn state_cleared(&self) -> bool {
        self.state_cleared
    }

    pub fn replies_sent(&self) -> usize {
        self.replies_sent
    }

    pub async fn send_text(&mut self, text: impl Into<String> + Send) -> Result<(), TurnError> {
        self.send(OutboundActivity::text(text)).await
    }

    pub async fn send(&mut self, reply: OutboundActivity) -> Result<(), TurnError> {
        self.sink.send(reply.in_reply_to(self.activity)).await?;
        self.replies_sent += 1;
        Ok(())
    }
}
