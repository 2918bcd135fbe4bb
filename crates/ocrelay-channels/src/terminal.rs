//! Line-oriented channel over a reader/writer pair, stdin/stdout by default.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::Mutex;

use crate::{
    channel::Channel,
    error::ChannelError,
    types::{ChannelStatus, InboundMessage, OutboundMessage},
};

pub const PLATFORM: &str = "terminal";
pub const CONVERSATION: &str = "local";

/// Every input line is one inbound message from a single local
/// conversation; every outbound message is written followed by a newline.
pub struct TerminalChannel<R, W> {
    reader: Mutex<R>,
    writer: Mutex<W>,
    sender: Option<String>,
    status: ChannelStatus,
}

impl TerminalChannel<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> TerminalChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            sender: std::env::var("USER").ok().filter(|u| !u.is_empty()),
            status: ChannelStatus::Disconnected,
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Next non-blank input line, or `None` at end of input.
    pub async fn next_message(&mut self) -> Result<Option<InboundMessage>, ChannelError> {
        if self.status != ChannelStatus::Connected {
            return Err(ChannelError::ConnectionFailed("terminal not connected".into()));
        }
        let reader = self.reader.get_mut();
        let mut line = String::new();
        loop {
            line.clear();
            let read = match reader.read_line(&mut line).await {
                Ok(read) => read,
                Err(e) => {
                    self.status = ChannelStatus::Error(e.to_string());
                    return Err(e.into());
                }
            };
            if read == 0 {
                self.status = ChannelStatus::Disconnected;
                return Ok(None);
            }
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            let mut msg = InboundMessage::new(PLATFORM, CONVERSATION, text);
            msg.sender = self.sender.clone();
            return Ok(Some(msg));
        }
    }

    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<R, W> Channel for TerminalChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    fn name(&self) -> &str {
        PLATFORM
    }

    async fn connect(&mut self) -> Result<(), ChannelError> {
        self.status = ChannelStatus::Connected;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), ChannelError> {
        self.writer.get_mut().flush().await?;
        self.status = ChannelStatus::Disconnected;
        Ok(())
    }

    async fn send(&self, msg: &OutboundMessage) -> Result<(), ChannelError> {
        let mut writer = self.writer.lock().await;
        let write = async {
            writer.write_all(msg.content.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await
        };
        write
            .await
            .map_err(|e| ChannelError::SendFailed(e.to_string()))
    }

    fn status(&self) -> ChannelStatus {
        self.status.clone()
    }
}
