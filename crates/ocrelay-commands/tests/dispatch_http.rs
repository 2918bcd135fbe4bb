// End-to-end dispatch through the real HTTP client against a mock server.

use std::time::{Duration, Instant};

use ocrelay_client::OpenCodeClient;
use ocrelay_commands::{ChatContext, CommandError, Dispatcher};
use ocrelay_core::config::{ChatConfig, OpenCodeConfig};
use serde_json::json;
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dispatcher(server_url: String, timeout: u64) -> Dispatcher<OpenCodeClient> {
    let client = OpenCodeClient::new(&OpenCodeConfig {
        server_url,
        timeout,
        ..OpenCodeConfig::default()
    })
    .unwrap();
    Dispatcher::new(client, ChatConfig::default())
}

#[tokio::test]
async fn usage_errors_never_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let d = dispatcher(server.uri(), 5);
    for text in ["/oc frobnicate", "/oc chat", "/oc cmd", "/oc clear", "/oc session", "/oc"] {
        let out = d
            .handle_text(ChatContext::default(), text, None)
            .await
            .unwrap();
        assert!(
            !matches!(
                out.result,
                Err(CommandError::Request(_) | CommandError::Server { .. })
            ),
            "{text}"
        );
    }
}

#[tokio::test]
async fn chat_creates_session_then_relays_reply_verbatim() {
    let server = MockServer::start().await;
    let reply = "Line one\n\n    indented code\ntrailing  ";

    Mock::given(method("POST"))
        .and(path("/session"))
        .and(body_json(json!({"title": "Chat Session - bob"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ses_abcdef123456",
            "title": "Chat Session - bob"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/ses_abcdef123456/message"))
        .and(body_json(json!({"parts": [{"type": "text", "text": "what changed?"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "info": {"id": "msg_1", "role": "assistant"},
            "parts": [
                {"type": "step-start"},
                {"type": "text", "text": reply},
                {"type": "tool", "tool": "read"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let d = dispatcher(server.uri(), 5);
    let out = d
        .handle_text(ChatContext::default(), "/oc chat what changed?", Some("bob"))
        .await
        .unwrap();
    assert_eq!(out.result.unwrap(), reply);
    assert_eq!(out.context.active_session.as_deref(), Some("ses_abcdef123456"));
}

#[tokio::test]
async fn new_then_session_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ses_xyz",
            "title": "New session - 2026-10-16T09:00:00.000Z"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/session/ses_xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ses_xyz",
            "title": "New session - 2026-10-16T09:00:00.000Z",
            "time": {"created": 1_760_605_200_000_i64, "updated": 1_760_605_260_000_i64}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let d = dispatcher(server.uri(), 5);
    let created = d.handle_text(ChatContext::default(), "/oc new", None).await.unwrap();
    assert!(created.result.unwrap().contains("ses_xyz"));

    let shown = d.handle_text(created.context, "/oc session", None).await.unwrap();
    let text = shown.result.unwrap();
    assert!(text.contains("Title: New session - 2026-10-16T09:00:00.000Z"));
    assert!(text.contains("Created: 2025-10-16"));
}

#[tokio::test]
async fn cmd_forwards_arguments_as_raw_string() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/ses_1/command"))
        .and(body_json(json!({"command": "review", "arguments": "src/main.rs --strict"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"info": {}, "parts": []})))
        .expect(1)
        .mount(&server)
        .await;

    let d = dispatcher(server.uri(), 5);
    let out = d
        .handle_text(
            ChatContext::with_session("ses_1"),
            "/oc cmd /review src/main.rs --strict",
            None,
        )
        .await
        .unwrap();
    assert_eq!(out.result.unwrap(), "Command completed");
}

#[tokio::test]
async fn server_error_detail_reaches_the_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/ses_gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "name": "NotFoundError",
            "data": {"message": "Session not found: ses_gone"}
        })))
        .mount(&server)
        .await;

    let d = dispatcher(server.uri(), 5);
    let out = d
        .handle_text(ChatContext::with_session("ses_gone"), "/oc session", None)
        .await
        .unwrap();
    assert_eq!(
        out.reply_text("oc"),
        "Request failed: HTTP 404\nSession not found: ses_gone"
    );
}

#[tokio::test]
async fn health_on_stalled_server_answers_within_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/global/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"healthy": true}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let d = dispatcher(server.uri(), 1);
    let started = Instant::now();
    let out = d.handle_text(ChatContext::default(), "/oc health", None).await.unwrap();
    let elapsed = started.elapsed();

    let text = out.result.unwrap();
    assert!(text.contains("unreachable"), "{text}");
    assert!(text.contains("timed out after 1s"), "{text}");
    assert!(elapsed >= Duration::from_secs(1), "took {elapsed:?}");
    assert!(elapsed < Duration::from_secs(4), "took {elapsed:?}");
}

#[tokio::test]
async fn health_on_closed_port_reports_unreachable() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let d = dispatcher(format!("http://127.0.0.1:{port}"), 5);
    let out = d.handle_text(ChatContext::default(), "/oc health", None).await.unwrap();
    assert!(out.result.unwrap().contains("status: unreachable"));
}

#[tokio::test]
async fn health_reports_version_when_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/global/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "healthy": true,
            "version": "0.15.3"
        })))
        .mount(&server)
        .await;

    let d = dispatcher(server.uri(), 5);
    let out = d.handle_text(ChatContext::default(), "/oc health", None).await.unwrap();
    let text = out.result.unwrap();
    assert!(text.contains("status: reachable"));
    assert!(text.contains("Version: 0.15.3"));
}
