//! The `/oc` chat command: parsing, dispatch and reply formatting.
//!
//! Hosts call [`Dispatcher::handle_text`] with the conversation's current
//! [`ChatContext`] and store the context that comes back. The dispatcher
//! itself keeps no per-conversation state.

pub mod command;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod format;

pub use command::{parse, OcCommand};
pub use context::{ChatContext, ContextKey};
pub use dispatch::{Dispatched, Dispatcher, Invocation};
pub use error::CommandError;
