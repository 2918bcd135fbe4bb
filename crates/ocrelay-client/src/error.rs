/// Failures talking to the OpenCode Server.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// `server_url` is not a usable http(s) base URL.
    #[error("invalid server URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The server could not be reached or the request timed out.
    #[error("request failed: {message}")]
    Request { message: String, timed_out: bool },

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status}{}", detail_suffix(.detail))]
    Server { status: u16, detail: Option<String> },

    /// A success response whose body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ClientError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            return ClientError::Request {
                message: format!("timed out after {timeout_secs}s"),
                timed_out: true,
            };
        }
        ClientError::Request {
            message: describe(&err),
            timed_out: false,
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(self, ClientError::Request { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Request { timed_out: true, .. })
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {d}"),
        None => String::new(),
    }
}

/// Flatten an error and its source chain into one line.
///
/// reqwest's top-level message is only "error sending request for url";
/// the useful part ("Connection refused", DNS failure) is further down.
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

/// Pull a human-readable message out of an error body.
///
/// Recognises the OpenCode `{ name, data: { message } }` envelope and flat
/// `message` / `error` fields; otherwise falls back to the trimmed body.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let candidates = [
            value.pointer("/data/message"),
            value.get("message"),
            value.get("error").filter(|e| e.is_string()),
            value.pointer("/error/message"),
        ];
        for candidate in candidates.into_iter().flatten() {
            if let Some(text) = candidate.as_str().filter(|s| !s.is_empty()) {
                return Some(text.to_string());
            }
        }
    }

    Some(trimmed.to_string())
}
