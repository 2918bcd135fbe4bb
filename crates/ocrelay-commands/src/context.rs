use serde::{Deserialize, Serialize};

/// Per-conversation relay state, passed into and returned from every
/// dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatContext {
    /// OpenCode session that `chat` and `cmd` talk to.
    pub active_session: Option<String>,
}

impl ChatContext {
    pub fn with_session(id: impl Into<String>) -> Self {
        Self {
            active_session: Some(id.into()),
        }
    }
}

/// Identifies one conversation on one chat platform.
///
/// Two users in the same group share a context; the same user in two
/// groups does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextKey {
    pub platform: String,
    pub conversation: String,
}

impl ContextKey {
    pub fn new(platform: impl Into<String>, conversation: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            conversation: conversation.into(),
        }
    }
}

impl std::fmt::Display for ContextKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.platform, self.conversation)
    }
}
