//! Wire models for the OpenCode Server payloads the relay reads.
//!
//! Only the fields the relay renders are modelled; everything else the
//! server sends is ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A server-owned conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub time: Option<SessionTime>,
}

impl Session {
    /// First eight characters of the id, as shown in listings.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.time.as_ref().and_then(|t| t.created).and_then(DateTime::from_timestamp_millis)
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.time.as_ref().and_then(|t| t.updated).and_then(DateTime::from_timestamp_millis)
    }
}

/// Server timestamps, epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTime {
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub updated: Option<i64>,
}

/// One invocable slash command advertised by `GET /command`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `GET /global/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthInfo {
    #[serde(default)]
    pub healthy: bool,
    #[serde(default)]
    pub version: Option<String>,
}

/// One part of an assistant reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Body returned by the message and command endpoints: `{ info, parts }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageReply {
    #[serde(default)]
    pub info: Option<serde_json::Value>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

impl MessageReply {
    /// Concatenate every `text` part, newline-separated, in server order.
    ///
    /// Tool calls, step markers and other non-text parts are skipped.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter(|p| p.kind == "text")
            .map(|p| p.text.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_tolerates_missing_fields_and_extras() {
        let json = r#"{"id":"ses_01","projectID":"p","version":"1.0"}"#;
        let s: Session = serde_json::from_str(json).unwrap();
        assert_eq!(s.id, "ses_01");
        assert!(s.title.is_none());
        assert!(s.created_at().is_none());
    }

    #[test]
    fn session_timestamps_are_epoch_millis() {
        let json = r#"{
            "id": "x",
            "title": "t",
            "time": {"created": 1700000000000, "updated": 1700000060000}
        }"#;
        let s: Session = serde_json::from_str(json).unwrap();
        assert_eq!(s.created_at().unwrap().timestamp(), 1_700_000_000);
        assert_eq!(s.updated_at().unwrap().timestamp(), 1_700_000_060);
    }

    #[test]
    fn short_id_truncates_to_eight_chars() {
        let s = Session {
            id: "ses_abcdef123".into(),
            title: None,
            time: None,
        };
        assert_eq!(s.short_id(), "ses_abcd");
        let s = Session {
            id: "abc".into(),
            title: None,
            time: None,
        };
        assert_eq!(s.short_id(), "abc");
    }

    #[test]
    fn reply_text_joins_only_text_parts() {
        let json = r#"{
            "info": {"id": "msg_1"},
            "parts": [
                {"type": "step-start"},
                {"type": "text", "text": "first"},
                {"type": "tool", "tool": "bash"},
                {"type": "text", "text": "second"}
            ]
        }"#;
        let reply: MessageReply = serde_json::from_str(json).unwrap();
        assert_eq!(reply.text(), "first\nsecond");
    }

    #[test]
    fn reply_without_parts_is_empty() {
        let reply: MessageReply = serde_json::from_str("{}").unwrap();
        assert_eq!(reply.text(), "");
    }
}
