use async_trait::async_trait;

use crate::{
    error::ChannelError,
    types::{ChannelStatus, OutboundMessage},
};

/// Interface implemented by every chat host adapter.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Stable lowercase identifier, also used as the platform name of the
    /// messages this channel produces.
    fn name(&self) -> &str;

    async fn connect(&mut self) -> Result<(), ChannelError>;

    async fn disconnect(&mut self) -> Result<(), ChannelError>;

    /// Deliver one outbound message. Takes `&self` so replies can be sent
    /// while the adapter keeps reading.
    async fn send(&self, msg: &OutboundMessage) -> Result<(), ChannelError>;

    fn status(&self) -> ChannelStatus;
}
