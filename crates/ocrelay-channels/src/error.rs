use thiserror::Error;

/// Errors raised by a channel while moving messages in or out.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The channel is not connected, or was closed underneath us.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A message could not be delivered.
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
