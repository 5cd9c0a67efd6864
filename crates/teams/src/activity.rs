use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cards::AdaptiveCard;

pub const ADAPTIVE_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    #[default]
    Message,
    ConversationUpdate,
    Typing,
    Other(String),
}

impl ActivityType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Message => "message",
            Self::ConversationUpdate => "conversationUpdate",
            Self::Typing => "typing",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ActivityType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "message" => Self::Message,
            "conversationUpdate" => Self::ConversationUpdate,
            "typing" => Self::Typing,
            _ => Self::Other(value),
        }
    }
}

impl From<ActivityType> for String {
    fn from(value: ActivityType) -> Self {
        value.as_str().to_owned()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Inbound activity. Fields this bot does not read are kept in `extra` so
/// `/diag` can echo the payload as it arrived.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationAccount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<ChannelAccount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Activity {
    pub fn message(conversation_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            activity_type: ActivityType::Message,
            text: Some(text.into()),
            conversation: Some(ConversationAccount { id: conversation_id.into(), name: None }),
            ..Self::default()
        }
    }

    pub fn is_message(&self) -> bool {
        self.activity_type == ActivityType::Message
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation.as_ref().map(|conversation| conversation.id.as_str())
    }

    /// True for a conversation update that adds anyone, the bot included. A
    /// personal-scope install only ever reports the bot joining.
    pub fn adds_members(&self) -> bool {
        self.activity_type == ActivityType::ConversationUpdate && !self.members_added.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: &'static str,
    pub content: AdaptiveCard,
}

impl Attachment {
    pub fn adaptive_card(card: AdaptiveCard) -> Self {
        Self { content_type: ADAPTIVE_CARD_CONTENT_TYPE, content: card }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundActivity {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_format: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_layout: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationAccount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl OutboundActivity {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            activity_type: ActivityType::Message,
            text: Some(text.into()),
            text_format: Some("markdown"),
            attachments: Vec::new(),
            attachment_layout: None,
            reply_to_id: None,
            conversation: None,
            timestamp: None,
        }
    }

    pub fn cards(cards: Vec<AdaptiveCard>) -> Self {
        Self {
            activity_type: ActivityType::Message,
            text: None,
            text_format: None,
            attachments: cards.into_iter().map(Attachment::adaptive_card).collect(),
            attachment_layout: Some("list"),
            reply_to_id: None,
            conversation: None,
            timestamp: None,
        }
    }

    /// Addresses the reply to the conversation and activity it answers.
    pub fn in_reply_to(mut self, inbound: &Activity) -> Self {
        self.reply_to_id = inbound.id.clone();
        self.conversation = inbound.conversation.clone();
        self.timestamp = Some(Utc::now());
        self
    }

    pub fn text_content(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}
