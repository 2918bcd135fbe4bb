use ocrelay_client::ClientError;
use thiserror::Error;

/// Why a `/oc` invocation produced no normal reply.
///
/// Every variant renders to chat text via [`CommandError::to_chat_text`];
/// none of them is fatal to the host.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Malformed or unknown subcommand, or a missing required argument.
    /// The message is the usage text to show.
    #[error("{0}")]
    Usage(String),

    /// `session` was asked for with no active session in this conversation.
    #[error("no active session")]
    NoActiveSession,

    /// The OpenCode Server could not be reached or timed out.
    #[error("connection to OpenCode Server failed: {0}")]
    Request(String),

    /// The OpenCode Server answered with a non-success status.
    #[error("OpenCode Server returned HTTP {status}")]
    Server { status: u16, detail: Option<String> },

    /// The server answered 2xx with a body we could not read.
    #[error("unexpected response from OpenCode Server: {0}")]
    Decode(String),
}

impl CommandError {
    /// Short code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::Usage(_) => "USAGE",
            CommandError::NoActiveSession => "NO_ACTIVE_SESSION",
            CommandError::Request(_) => "REQUEST_FAILED",
            CommandError::Server { .. } => "SERVER_ERROR",
            CommandError::Decode(_) => "DECODE_ERROR",
        }
    }

    /// Render as the message the user sees in chat.
    pub fn to_chat_text(&self, word: &str) -> String {
        match self {
            CommandError::Usage(text) => text.clone(),
            CommandError::NoActiveSession => format!(
                "No active session. Start one with /{word} chat <message> or /{word} new [title]."
            ),
            CommandError::Request(reason) => format!("Network error: {reason}"),
            CommandError::Server { status, detail } => match detail {
                Some(detail) => format!("Request failed: HTTP {status}\n{detail}"),
                None => format!("Request failed: HTTP {status}"),
            },
            CommandError::Decode(reason) => format!("Unexpected server response: {reason}"),
        }
    }
}

impl From<ClientError> for CommandError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Request { message, .. } => CommandError::Request(message),
            ClientError::Server { status, detail } => CommandError::Server { status, detail },
            ClientError::Decode(reason) => CommandError::Decode(reason),
            // Only raised while building a client; surfaced as a connectivity failure.
            invalid @ ClientError::InvalidUrl { .. } => CommandError::Request(invalid.to_string()),
        }
    }
}
