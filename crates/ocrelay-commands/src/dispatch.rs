//! One handler per [`OcCommand`] variant.
//!
//! The dispatcher owns the API client and the chat settings, nothing else.
//! Conversation state arrives as a [`ChatContext`] and leaves in the
//! returned [`Dispatched`], so any number of conversations can run through
//! one dispatcher concurrently.

use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use ocrelay_client::{ClientError, OpenCodeApi};
use ocrelay_core::config::ChatConfig;

use crate::command::{self, OcCommand};
use crate::context::ChatContext;
use crate::error::CommandError;
use crate::format;

/// A parsed command plus who sent it.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: OcCommand,
    /// Display name of the sender, used for auto-created session titles.
    pub sender: Option<String>,
}

/// Result of one dispatch: the context to store and the reply.
#[derive(Debug)]
pub struct Dispatched {
    pub context: ChatContext,
    pub result: Result<String, CommandError>,
}

impl Dispatched {
    /// The chat text to deliver, whether the command succeeded or not.
    pub fn reply_text(&self, word: &str) -> String {
        match &self.result {
            Ok(text) => text.clone(),
            Err(err) => err.to_chat_text(word),
        }
    }
}

pub struct Dispatcher<A> {
    api: A,
    settings: ChatConfig,
}

impl<A: OpenCodeApi> Dispatcher<A> {
    pub fn new(api: A, settings: ChatConfig) -> Self {
        Self { api, settings }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Command word without its slash, e.g. `"oc"`.
    pub fn command_word(&self) -> &str {
        &self.settings.command
    }

    /// Parse `text` against this dispatcher's command word.
    pub fn parse(&self, text: &str) -> Option<Result<OcCommand, CommandError>> {
        command::parse(text, &self.settings.command)
    }

    /// Parse and run a chat message.
    ///
    /// Returns `None` when the message is not addressed to the relay.
    /// Parse failures come back as a [`Dispatched`] carrying the usage error
    /// and the untouched context; no request is made for them.
    pub async fn handle_text(
        &self,
        context: ChatContext,
        text: &str,
        sender: Option<&str>,
    ) -> Option<Dispatched> {
        let parsed = self.parse(text)?;
        Some(match parsed {
            Ok(command) => {
                let invocation = Invocation {
                    command,
                    sender: sender.map(String::from),
                };
                self.dispatch(context, &invocation).await
            }
            Err(err) => Dispatched {
                context,
                result: Err(err),
            },
        })
    }

    /// Run one command against the server.
    #[instrument(skip_all, fields(command = invocation.command.name()))]
    pub async fn dispatch(&self, mut context: ChatContext, invocation: &Invocation) -> Dispatched {
        let result = self.run(&mut context, invocation).await;
        if let Err(ref err) = result {
            debug!(code = err.code(), error = %err, "command failed");
        }
        Dispatched { context, result }
    }

    async fn run(
        &self,
        context: &mut ChatContext,
        invocation: &Invocation,
    ) -> Result<String, CommandError> {
        match &invocation.command {
            OcCommand::Help => Ok(command::usage(&self.settings.command)),

            OcCommand::Chat { message } => {
                let session_id = self.ensure_session(context, invocation).await?;
                let reply = self.api.send_message(&session_id, message).await?;
                let text = reply.text();
                if text.is_empty() {
                    Ok(format::EMPTY_REPLY.to_string())
                } else {
                    Ok(text)
                }
            }

            OcCommand::Session => {
                let session_id = context
                    .active_session
                    .as_deref()
                    .ok_or(CommandError::NoActiveSession)?;
                let session = self.api.get_session(session_id).await?;
                Ok(format::session_details(&session))
            }

            OcCommand::Sessions => {
                let sessions = self.api.list_sessions().await?;
                Ok(format::session_list(&sessions, self.settings.list_limit))
            }

            OcCommand::New { title } => {
                let session = self.api.create_session(title.as_deref()).await?;
                info!(session_id = %session.id, "created session");
                context.active_session = Some(session.id.clone());
                Ok(format::session_created(&session))
            }

            OcCommand::Clear => match context.active_session.take() {
                Some(previous) => {
                    debug!(session_id = %previous, "cleared active session");
                    Ok("Cleared the current session.".to_string())
                }
                None => Ok("No active session.".to_string()),
            },

            OcCommand::Commands => {
                let commands = self.api.list_commands().await?;
                Ok(format::command_list(
                    &commands,
                    self.settings.command_list_limit,
                ))
            }

            OcCommand::Cmd { name, arguments } => {
                let session_id = self.ensure_session(context, invocation).await?;
                let reply = self
                    .api
                    .execute_command(&session_id, name, arguments)
                    .await?;
                let text = reply.text();
                if text.is_empty() {
                    Ok(format::COMMAND_DONE.to_string())
                } else {
                    Ok(text)
                }
            }

            OcCommand::Health => self.health_report().await,
        }
    }

    /// Active session id, creating and activating one if there is none.
    async fn ensure_session(
        &self,
        context: &mut ChatContext,
        invocation: &Invocation,
    ) -> Result<String, CommandError> {
        if let Some(id) = &context.active_session {
            return Ok(id.clone());
        }

        let title = format!(
            "Chat Session - {}",
            invocation.sender.as_deref().unwrap_or("user")
        );
        let session = self.api.create_session(Some(&title)).await?;
        info!(session_id = %session.id, "created session for conversation");
        context.active_session = Some(session.id.clone());
        Ok(session.id)
    }

    /// Reachability is the answer here, so connection failures render as a
    /// normal reply rather than an error.
    async fn health_report(&self) -> Result<String, CommandError> {
        let started = Instant::now();
        match self.api.health().await {
            Ok(info) => Ok(format::health_reachable(&info, started.elapsed())),
            Err(ClientError::Server { status, detail }) => Ok(format::health_unhealthy(
                status,
                detail.as_deref(),
                started.elapsed(),
            )),
            Err(ClientError::Request { message, timed_out }) => {
                warn!(error = %message, timed_out, "OpenCode Server unreachable");
                Ok(format::health_unreachable(&message, started.elapsed()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
