use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use ocrelay_channels::{InboundMessage, TerminalChannel};
use ocrelay_client::{OpenCodeApi, OpenCodeClient};
use ocrelay_core::RelayConfig;

const DEFAULT_LOG_FILTER: &str = "ocrelay=info,ocrelay_channels=info,ocrelay_commands=info,\
                                  ocrelay_client=info,tower_http=debug";

mod app;
mod http;
mod repl;

#[derive(Parser)]
#[command(name = "ocrelay")]
#[command(about = "Chat-platform relay for an OpenCode Server", long_about = None)]
struct Cli {
    /// Config file (default: ~/.ocrelay/ocrelay.toml)
    #[arg(short, long, env = "OCRELAY_CONFIG", global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the webhook surface chat hosts post messages to.
    Serve {
        #[arg(short = 'H', long)]
        bind: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Interactive terminal channel on stdin/stdout.
    Repl,
    /// Run one relay command and print the replies.
    Exec {
        /// Command text, e.g. `/oc sessions` or just `sessions`.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    info!(opencode = ?config.opencode, "relay configured");

    match cli.command {
        Commands::Serve { bind, port } => serve(config, bind, port).await,
        Commands::Repl => {
            let state = app::AppState::new(config)?;
            startup_check(state.router.dispatcher().api()).await;
            let mut channel = TerminalChannel::stdio();
            repl::run(&state.router, &mut channel).await
        }
        Commands::Exec { text } => exec(config, text.join(" ")).await,
    }
}

/// Explicit path > OCRELAY_CONFIG env > ~/.ocrelay/ocrelay.toml.
///
/// A file that exists but does not parse or validate stops startup.
fn load_config(path: Option<&str>) -> anyhow::Result<RelayConfig> {
    RelayConfig::load(path).with_context(|| {
        format!(
            "invalid relay config ({})",
            path.unwrap_or("~/.ocrelay/ocrelay.toml")
        )
    })
}

async fn serve(config: RelayConfig, bind: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let bind = bind.unwrap_or_else(|| config.gateway.bind.clone());
    let port = port.unwrap_or(config.gateway.port);
    if config.gateway.token.is_none() {
        warn!("gateway.token not set; /v1/messages accepts unauthenticated requests");
    }

    let state = Arc::new(app::AppState::new(config)?);
    startup_check(state.router.dispatcher().api()).await;
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("ocrelay gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

async fn exec(config: RelayConfig, text: String) -> anyhow::Result<()> {
    let state = app::AppState::new(config)?;
    let word = state.router.dispatcher().command_word().to_string();

    // Bare subcommands are accepted for convenience: `ocrelay exec sessions`.
    let text = if text.trim_start().starts_with('/') {
        text
    } else {
        format!("/{word} {text}")
    };

    let inbound = InboundMessage::new(
        ocrelay_channels::terminal::PLATFORM,
        ocrelay_channels::terminal::CONVERSATION,
        text,
    );
    let Some(replies) = state.router.route(&inbound).await else {
        anyhow::bail!("not a relay command; expected /{word} <subcommand>");
    };
    for reply in replies {
        println!("{}", reply.content);
    }
    Ok(())
}

/// One health ping at startup. Never fatal: the relay answers chat commands
/// with connectivity errors until the server comes up.
async fn startup_check(api: &OpenCodeClient) {
    match api.health().await {
        Ok(health) => info!(
            server = %api.base_url(),
            healthy = health.healthy,
            version = health.version.as_deref().unwrap_or("unknown"),
            "OpenCode Server reachable"
        ),
        Err(e) if e.is_timeout() => warn!(
            server = %api.base_url(),
            error = %e,
            "OpenCode Server did not answer the startup check in time"
        ),
        Err(e) if e.is_request() => warn!(
            server = %api.base_url(),
            error = %e,
            "OpenCode Server not reachable at startup"
        ),
        Err(e) => warn!(
            server = %api.base_url(),
            error = %e,
            "OpenCode Server answered the startup check with an error"
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn write_config(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("ocrelay-{}-{name}.toml", std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn invalid_config_file_stops_startup() {
        let path = write_config("zero-timeout", "[opencode]\ntimeout = 0\n");
        let err = load_config(path.to_str()).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(format!("{err:#}").contains("opencode.timeout"), "{err:#}");
    }

    #[test]
    fn unparsable_config_file_stops_startup() {
        let path = write_config("garbage", "[opencode\nserver_url = ");
        let result = load_config(path.to_str());
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn valid_config_file_is_used() {
        let path = write_config("valid", "[chat]\ncommand = \"code\"\n");
        let config = load_config(path.to_str()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.chat.command, "code");
    }

    #[test]
    fn missing_config_file_means_defaults() {
        let path = std::env::temp_dir().join("ocrelay-does-not-exist.toml");
        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.opencode.timeout, 300);
    }
}
