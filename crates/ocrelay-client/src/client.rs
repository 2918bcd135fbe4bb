use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use ocrelay_core::config::OpenCodeConfig;
use ocrelay_core::types::{CommandInfo, HealthInfo, MessageReply, Session};

use crate::api::OpenCodeApi;
use crate::error::{error_detail, ClientError};

/// reqwest-backed OpenCode Server client.
///
/// Holds one connection pool for the life of the relay. Cloning is cheap and
/// shares the pool.
#[derive(Clone)]
pub struct OpenCodeClient {
    http: reqwest::Client,
    base: Url,
    credentials: Option<(String, String)>,
    timeout_secs: u64,
}

impl std::fmt::Debug for OpenCodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenCodeClient")
            .field("base", &self.base.as_str())
            .field("auth", &self.credentials.is_some())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Serialize)]
struct CreateSessionBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
}

#[derive(Serialize)]
struct TextPartInput<'a> {
    r#type: &'static str,
    text: &'a str,
}

#[derive(Serialize)]
struct PromptBody<'a> {
    parts: Vec<TextPartInput<'a>>,
}

#[derive(Serialize)]
struct CommandBody<'a> {
    command: &'a str,
    arguments: &'a str,
}

impl OpenCodeClient {
    /// Build a client from config. Fails only on an unusable `server_url`.
    pub fn new(config: &OpenCodeConfig) -> Result<Self, ClientError> {
        let raw = config.server_url.trim();
        let base = Url::parse(raw).map_err(|e| ClientError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: raw.to_string(),
                reason: "expected an http:// or https:// URL".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout_duration())
            .build()
            .map_err(|e| ClientError::InvalidUrl {
                url: raw.to_string(),
                reason: e.to_string(),
            })?;

        let credentials = config
            .credentials()
            .map(|(user, pass)| (user.to_string(), pass.to_string()));

        Ok(Self {
            http,
            base,
            credentials,
            timeout_secs: config.timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base() was rejected in new(), so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self.http.request(method, self.endpoint(segments));
        match &self.credentials {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }

    /// Send a request and decode a JSON success body.
    ///
    /// Non-2xx statuses become [`ClientError::Server`] with whatever detail
    /// the body carries.
    async fn send<T: DeserializeOwned>(
        &self,
        op: &'static str,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        debug!(op, "sending request to OpenCode");

        let resp = builder
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout_secs))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout_secs))?;

        if !status.is_success() {
            warn!(op, status = status.as_u16(), body = %body, "OpenCode API error");
            return Err(ClientError::Server {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(op, error = %e, "OpenCode response did not decode");
            ClientError::Decode(format!("{op}: {e}"))
        })
    }
}

#[async_trait]
impl OpenCodeApi for OpenCodeClient {
    async fn health(&self) -> Result<HealthInfo, ClientError> {
        self.send("health", self.request(Method::GET, &["global", "health"]))
            .await
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, ClientError> {
        self.send("session.list", self.request(Method::GET, &["session"]))
            .await
    }

    async fn create_session(&self, title: Option<&str>) -> Result<Session, ClientError> {
        let body = CreateSessionBody { title };
        self.send(
            "session.create",
            self.request(Method::POST, &["session"]).json(&body),
        )
        .await
    }

    async fn get_session(&self, session_id: &str) -> Result<Session, ClientError> {
        self.send(
            "session.get",
            self.request(Method::GET, &["session", session_id]),
        )
        .await
    }

    async fn send_message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<MessageReply, ClientError> {
        let body = PromptBody {
            parts: vec![TextPartInput { r#type: "text", text }],
        };
        self.send(
            "session.prompt",
            self.request(Method::POST, &["session", session_id, "message"])
                .json(&body),
        )
        .await
    }

    async fn list_commands(&self) -> Result<Vec<CommandInfo>, ClientError> {
        self.send("command.list", self.request(Method::GET, &["command"]))
            .await
    }

    async fn execute_command(
        &self,
        session_id: &str,
        command: &str,
        arguments: &str,
    ) -> Result<MessageReply, ClientError> {
        let body = CommandBody { command, arguments };
        self.send(
            "session.command",
            self.request(Method::POST, &["session", session_id, "command"])
                .json(&body),
        )
        .await
    }
}
