use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ocrelay_commands::ContextKey;

/// A chat message handed to the relay by a chat host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Chat platform name (e.g. "telegram", "discord", "terminal").
    pub platform: String,

    /// Platform-native conversation id (chat, channel or DM id).
    pub conversation: String,

    /// Display name of the sender, if the host knows it.
    #[serde(default)]
    pub sender: Option<String>,

    /// Plain text content of the message.
    pub text: String,

    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(
        platform: impl Into<String>,
        conversation: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            conversation: conversation.into(),
            sender: None,
            text: text.into(),
            received_at: Utc::now(),
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Key of the conversation this message belongs to.
    pub fn context_key(&self) -> ContextKey {
        ContextKey::new(&self.platform, &self.conversation)
    }
}

/// A reply to be delivered back into a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub platform: String,
    pub conversation: String,
    pub content: String,
    pub format: MessageFormat,
}

impl OutboundMessage {
    /// Reply into the conversation `inbound` came from.
    pub fn reply_to(
        inbound: &InboundMessage,
        content: impl Into<String>,
        format: MessageFormat,
    ) -> Self {
        Self {
            platform: inbound.platform.clone(),
            conversation: inbound.conversation.clone(),
            content: content.into(),
            format,
        }
    }
}

/// Formatting hint for outbound message content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageFormat {
    /// Relay-generated text: listings, status, errors.
    #[default]
    PlainText,

    /// Model output, passed through as the server wrote it.
    Markdown,
}

/// Runtime connection state of a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    Connected,
    Disconnected,
    Error(String),
}
