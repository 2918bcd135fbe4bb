//! `/oc <subcommand> [args]` parsing.

use crate::error::CommandError;

/// Every subcommand the relay understands.
///
/// Adding a variant forces a matching arm in the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcCommand {
    /// Bare `/oc`: show usage.
    Help,
    Chat { message: String },
    Session,
    Sessions,
    New { title: Option<String> },
    Clear,
    Commands,
    Cmd { name: String, arguments: String },
    Health,
}

impl OcCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OcCommand::Help => "help",
            OcCommand::Chat { .. } => "chat",
            OcCommand::Session => "session",
            OcCommand::Sessions => "sessions",
            OcCommand::New { .. } => "new",
            OcCommand::Clear => "clear",
            OcCommand::Commands => "commands",
            OcCommand::Cmd { .. } => "cmd",
            OcCommand::Health => "health",
        }
    }

    /// Acknowledgement sent before commands that wait on the model.
    pub fn progress_notice(&self) -> Option<&'static str> {
        match self {
            OcCommand::Chat { .. } => Some("Thinking..."),
            OcCommand::Cmd { .. } => Some("Running command..."),
            _ => None,
        }
    }
}

/// Parse a chat message addressed to the relay.
///
/// `word` is the command word without its slash (`"oc"` by default).
/// Returns `None` when the message is not a `/<word>` command at all, so the
/// host can pass it on untouched. Unknown subcommands and missing required
/// arguments come back as [`CommandError::Usage`].
pub fn parse(text: &str, word: &str) -> Option<Result<OcCommand, CommandError>> {
    let (head, rest) = split_word(text.trim());
    let head = head.strip_prefix('/')?;
    if !head.eq_ignore_ascii_case(word) {
        return None;
    }

    let (sub, args) = split_word(rest);
    if sub.is_empty() {
        return Some(Ok(OcCommand::Help));
    }

    Some(parse_subcommand(&sub.to_lowercase(), args, word))
}

fn parse_subcommand(sub: &str, args: &str, word: &str) -> Result<OcCommand, CommandError> {
    match sub {
        "chat" => {
            if args.is_empty() {
                return Err(CommandError::Usage(format!("Usage: /{word} chat <message>")));
            }
            Ok(OcCommand::Chat {
                message: args.to_string(),
            })
        }
        "session" => Ok(OcCommand::Session),
        "sessions" => Ok(OcCommand::Sessions),
        "new" => Ok(OcCommand::New {
            title: (!args.is_empty()).then(|| args.to_string()),
        }),
        "clear" => Ok(OcCommand::Clear),
        "commands" => Ok(OcCommand::Commands),
        "cmd" => {
            let (name, arguments) = split_word(args);
            if name.is_empty() {
                return Err(CommandError::Usage(format!(
                    "Usage: /{word} cmd <command> [args]"
                )));
            }
            Ok(OcCommand::Cmd {
                name: name.trim_start_matches('/').to_string(),
                arguments: arguments.to_string(),
            })
        }
        "health" => Ok(OcCommand::Health),
        other => Err(CommandError::Usage(format!(
            "Unknown command: {other}\nSend /{word} for help."
        ))),
    }
}

/// Full usage text for `/<word>`.
pub fn usage(word: &str) -> String {
    format!(
        "Usage: /{w} <command> [args]\n\
         Commands:\n\
         \x20 /{w} chat <message>  - talk to the AI\n\
         \x20 /{w} session         - show the current session\n\
         \x20 /{w} sessions        - list sessions\n\
         \x20 /{w} new [title]     - start a new session\n\
         \x20 /{w} clear           - forget the current session\n\
         \x20 /{w} commands        - list server commands\n\
         \x20 /{w} cmd <cmd> [args] - run a server command\n\
         \x20 /{w} health          - check server status",
        w = word
    )
}

/// Split off the first whitespace-delimited word; the remainder is trimmed
/// but keeps its inner whitespace.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim()),
        None => (s, ""),
    }
}
