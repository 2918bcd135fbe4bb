//! Chat-text rendering of OpenCode Server payloads.

use std::time::Duration;

use chrono::{DateTime, Utc};
use ocrelay_core::types::{CommandInfo, HealthInfo, Session};

const NOT_AVAILABLE: &str = "N/A";
const DESCRIPTION_MAX_CHARS: usize = 30;

pub const EMPTY_REPLY: &str = "(no response)";
pub const COMMAND_DONE: &str = "Command completed";

pub fn session_details(session: &Session) -> String {
    format!(
        "Current session:\n  ID: {}\n  Title: {}\n  Created: {}\n  Updated: {}",
        session.id,
        title_or_na(session),
        timestamp_or_na(session.created_at()),
        timestamp_or_na(session.updated_at()),
    )
}

pub fn session_created(session: &Session) -> String {
    format!(
        "Created new session: {}\n  Title: {}",
        session.id,
        title_or_na(session)
    )
}

/// Numbered listing, at most `limit` entries, in the order given.
pub fn session_list(sessions: &[Session], limit: usize) -> String {
    if sessions.is_empty() {
        return "No sessions".to_string();
    }

    let mut lines = vec!["Sessions:".to_string()];
    for (i, s) in sessions.iter().take(limit).enumerate() {
        lines.push(format!("  {}. [{}] {}", i + 1, s.short_id(), title_or_na(s)));
    }
    if sessions.len() > limit {
        lines.push(format!("  ... and {} more", sessions.len() - limit));
    }
    lines.join("\n")
}

pub fn command_list(commands: &[CommandInfo], limit: usize) -> String {
    if commands.is_empty() {
        return "No commands available".to_string();
    }

    let mut lines = vec!["Available commands:".to_string()];
    for cmd in commands.iter().take(limit) {
        let desc = cmd.description.as_deref().unwrap_or("");
        lines.push(format!(
            "  /{} - {}",
            cmd.name,
            truncate_chars(desc, DESCRIPTION_MAX_CHARS)
        ));
    }
    if commands.len() > limit {
        lines.push(format!("  ... and {} more", commands.len() - limit));
    }
    lines.join("\n")
}

pub fn health_reachable(info: &HealthInfo, latency: Duration) -> String {
    format!(
        "OpenCode Server status: reachable\n  Healthy: {}\n  Version: {}\n  Latency: {} ms",
        info.healthy,
        info.version.as_deref().unwrap_or(NOT_AVAILABLE),
        latency.as_millis()
    )
}

pub fn health_unhealthy(status: u16, detail: Option<&str>, latency: Duration) -> String {
    let mut out = format!(
        "OpenCode Server status: reachable, unhealthy\n  HTTP status: {}\n  Latency: {} ms",
        status,
        latency.as_millis()
    );
    if let Some(detail) = detail {
        out.push_str("\n  Detail: ");
        out.push_str(detail);
    }
    out
}

pub fn health_unreachable(reason: &str, elapsed: Duration) -> String {
    format!(
        "OpenCode Server status: unreachable\n  Error: {}\n  After: {} ms",
        reason,
        elapsed.as_millis()
    )
}

fn title_or_na(session: &Session) -> &str {
    session
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(NOT_AVAILABLE)
}

fn timestamp_or_na(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Cut to at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
