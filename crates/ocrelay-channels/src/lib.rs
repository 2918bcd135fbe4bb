pub mod channel;
pub mod error;
pub mod router;
pub mod store;
pub mod terminal;
pub mod types;

pub use channel::Channel;
pub use error::ChannelError;
pub use router::CommandRouter;
pub use store::ContextStore;
pub use terminal::TerminalChannel;
pub use types::{ChannelStatus, InboundMessage, MessageFormat, OutboundMessage};
