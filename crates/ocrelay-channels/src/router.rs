//! Inbound chat message → relay replies.

use std::sync::Arc;

use tracing::{debug, info};

use ocrelay_client::OpenCodeApi;
use ocrelay_commands::{CommandError, Dispatcher, Invocation, OcCommand};

use crate::{
    channel::Channel,
    error::ChannelError,
    store::ContextStore,
    types::{InboundMessage, MessageFormat, OutboundMessage},
};

/// Connects chat hosts to the dispatcher.
///
/// Owns the per-conversation context store; the dispatcher itself stays
/// stateless. Cheap to clone and share between tasks.
pub struct CommandRouter<A> {
    dispatcher: Arc<Dispatcher<A>>,
    contexts: Arc<ContextStore>,
}

impl<A> Clone for CommandRouter<A> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            contexts: Arc::clone(&self.contexts),
        }
    }
}

/// A message recognised as a relay command, not yet executed.
struct Pending<'a> {
    inbound: &'a InboundMessage,
    parsed: Result<OcCommand, CommandError>,
}

impl Pending<'_> {
    fn notice(&self) -> Option<OutboundMessage> {
        let command = self.parsed.as_ref().ok()?;
        let text = command.progress_notice()?;
        Some(OutboundMessage::reply_to(
            self.inbound,
            text,
            MessageFormat::PlainText,
        ))
    }
}

impl<A: OpenCodeApi> CommandRouter<A> {
    pub fn new(dispatcher: Dispatcher<A>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            contexts: Arc::new(ContextStore::new()),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<A> {
        &self.dispatcher
    }

    pub fn contexts(&self) -> &ContextStore {
        &self.contexts
    }

    /// Handle `inbound` and return every reply in delivery order.
    ///
    /// `None` means the message was not a relay command. Long-running
    /// commands yield their progress notice first.
    pub async fn route(&self, inbound: &InboundMessage) -> Option<Vec<OutboundMessage>> {
        let pending = self.recognise(inbound)?;
        let mut replies = Vec::with_capacity(2);
        if let Some(notice) = pending.notice() {
            replies.push(notice);
        }
        replies.push(self.execute(pending).await);
        Some(replies)
    }

    /// Handle `inbound` and send replies straight to `channel`, the notice
    /// before the command starts. Returns whether the message was handled.
    pub async fn deliver(
        &self,
        inbound: &InboundMessage,
        channel: &dyn Channel,
    ) -> Result<bool, ChannelError> {
        let Some(pending) = self.recognise(inbound) else {
            return Ok(false);
        };
        if let Some(notice) = pending.notice() {
            channel.send(&notice).await?;
        }
        let reply = self.execute(pending).await;
        channel.send(&reply).await?;
        Ok(true)
    }

    fn recognise<'a>(&self, inbound: &'a InboundMessage) -> Option<Pending<'a>> {
        let parsed = self.dispatcher.parse(&inbound.text)?;
        Some(Pending { inbound, parsed })
    }

    async fn execute(&self, pending: Pending<'_>) -> OutboundMessage {
        let inbound = pending.inbound;
        let key = inbound.context_key();
        let word = self.dispatcher.command_word();

        let command = match pending.parsed {
            Ok(command) => command,
            Err(err) => {
                debug!(context = %key, code = err.code(), "rejected relay command");
                return OutboundMessage::reply_to(
                    inbound,
                    err.to_chat_text(word),
                    MessageFormat::PlainText,
                );
            }
        };

        info!(
            context = %key,
            platform = %inbound.platform,
            command = command.name(),
            "relay command"
        );

        let format = match command {
            OcCommand::Chat { .. } | OcCommand::Cmd { .. } => MessageFormat::Markdown,
            _ => MessageFormat::PlainText,
        };
        // A changed context from `new` or `clear` always lands; anything else
        // only writes over the snapshot it started from.
        let explicit = matches!(command, OcCommand::New { .. } | OcCommand::Clear);
        let invocation = Invocation {
            command,
            sender: inbound.sender.clone(),
        };

        let snapshot = self.contexts.load(&key);
        let dispatched = self.dispatcher.dispatch(snapshot.clone(), &invocation).await;
        let text = dispatched.reply_text(word);
        let format = if dispatched.result.is_ok() {
            format
        } else {
            MessageFormat::PlainText
        };
        if dispatched.context != snapshot {
            if explicit {
                self.contexts.save(key, dispatched.context);
            } else {
                self.contexts.compare_and_save(key, &snapshot, dispatched.context);
            }
        }

        OutboundMessage::reply_to(inbound, text, format)
    }
}
