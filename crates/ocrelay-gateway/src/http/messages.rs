//! Webhook surface for chat hosts: POST /v1/messages
//!
//! Auth: `Authorization: Bearer <token>` when `gateway.token` is set.
//!
//! Request:  `{"platform": "telegram", "conversation": "-100123", "sender": "ana",
//!             "text": "/oc health"}`
//! Response: `{"handled": true, "replies": [{"content": "...", "format": "plain_text"}]}`
//! Error:    `{"error": "..."}`
//!
//! The response is written once the command finishes, so a progress notice
//! ("Thinking...") comes back as the first entry of `replies`.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use ocrelay_channels::{InboundMessage, MessageFormat};

use crate::app::AppState;

#[derive(Deserialize)]
pub struct MessageRequest {
    pub platform: String,
    pub conversation: String,
    #[serde(default)]
    pub sender: Option<String>,
    pub text: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    /// False when the text was not addressed to the relay.
    pub handled: bool,
    pub replies: Vec<Reply>,
}

#[derive(Serialize)]
pub struct Reply {
    pub content: String,
    pub format: MessageFormat,
}

#[derive(Serialize)]
pub struct MessageError {
    pub error: String,
}

type Rejection = (StatusCode, Json<MessageError>);

fn reject(status: StatusCode, error: &str) -> Rejection {
    (
        status,
        Json(MessageError {
            error: error.to_string(),
        }),
    )
}

/// POST /v1/messages: run one inbound chat message through the relay.
///
/// Relay failures (server down, bad subcommand) are still 200 with the
/// failure rendered as a reply; only malformed requests are rejected.
pub async fn messages_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, Rejection> {
    if !check_auth(&state, &headers) {
        warn!(platform = %req.platform, "POST /v1/messages rejected: bad token");
        return Err(reject(
            StatusCode::UNAUTHORIZED,
            "Unauthorized. Set 'Authorization: Bearer <your-token>' header.",
        ));
    }

    if req.text.trim().is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "text cannot be empty"));
    }
    if req.platform.trim().is_empty() || req.conversation.trim().is_empty() {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "platform and conversation are required",
        ));
    }

    let mut inbound = InboundMessage::new(req.platform, req.conversation, req.text);
    inbound.sender = req.sender.filter(|s| !s.trim().is_empty());

    let response = match state.router.route(&inbound).await {
        Some(replies) => MessageResponse {
            handled: true,
            replies: replies
                .into_iter()
                .map(|r| Reply {
                    content: r.content,
                    format: r.format,
                })
                .collect(),
        },
        None => MessageResponse {
            handled: false,
            replies: Vec::new(),
        },
    };
    Ok(Json(response))
}

/// Returns true if the request is authorised.
fn check_auth(state: &AppState, headers: &HeaderMap) -> bool {
    match &state.config.gateway.token {
        None => true,
        Some(expected) => extract_bearer(headers)
            .map(|t| t == expected)
            .unwrap_or(false),
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::Request,
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{any, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use ocrelay_core::RelayConfig;

    use crate::app::{build_router, AppState};

    use super::*;

    fn app(server_url: &str, token: Option<&str>) -> Router {
        let mut config = RelayConfig::default();
        config.opencode.server_url = server_url.to_string();
        config.opencode.timeout = 5;
        config.gateway.token = token.map(String::from);
        build_router(Arc::new(AppState::new(config).unwrap()))
    }

    async fn post(app: Router, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = Request::builder()
            .method("POST")
            .uri("/v1/messages")
            .header("content-type", "application/json");
        if let Some(token) = token {
            req = req.header("authorization", format!("Bearer {token}"));
        }
        let response = app
            .oneshot(req.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_command_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/global/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "healthy": true,
                "version": "0.15.3"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = post(
            app(&server.uri(), None),
            json!({"platform": "slack", "conversation": "C1", "text": "/oc health"}),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["handled"], true);
        assert_eq!(body["replies"][0]["format"], "plain_text");
        assert!(body["replies"][0]["content"]
            .as_str()
            .unwrap()
            .contains("Version: 0.15.3"));
    }

    #[tokio::test]
    async fn chat_returns_notice_and_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ses_1"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/session/ses_1/message"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "parts": [{"type": "text", "text": "Done."}]
            })))
            .mount(&server)
            .await;

        let (status, body) = post(
            app(&server.uri(), None),
            json!({"platform": "tg", "conversation": "1", "sender": "ana", "text": "/oc chat go"}),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["replies"],
            json!([
                {"content": "Thinking...", "format": "plain_text"},
                {"content": "Done.", "format": "markdown"}
            ])
        );
    }

    #[tokio::test]
    async fn unrelated_text_is_not_handled() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (status, body) = post(
            app(&server.uri(), None),
            json!({"platform": "tg", "conversation": "1", "text": "lunch?"}),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"handled": false, "replies": []}));
    }

    #[tokio::test]
    async fn empty_text_is_bad_request() {
        let (status, body) = post(
            app("http://127.0.0.1:9", None),
            json!({"platform": "tg", "conversation": "1", "text": "   "}),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "text cannot be empty");
    }

    #[tokio::test]
    async fn token_is_enforced_when_configured() {
        let msg = json!({"platform": "tg", "conversation": "1", "text": "/oc"});

        let (status, _) = post(app("http://127.0.0.1:9", Some("s3cret")), msg.clone(), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) =
            post(app("http://127.0.0.1:9", Some("s3cret")), msg.clone(), Some("wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) =
            post(app("http://127.0.0.1:9", Some("s3cret")), msg, Some("s3cret")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["replies"][0]["content"]
            .as_str()
            .unwrap()
            .starts_with("Usage: /oc"));
    }

    #[tokio::test]
    async fn health_endpoint_reports_relay_liveness() {
        let response = app("http://127.0.0.1:9/", None)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["server_url"], "http://127.0.0.1:9");
    }
}
