use async_trait::async_trait;

use ocrelay_core::types::{CommandInfo, HealthInfo, MessageReply, Session};

use crate::error::ClientError;

/// The subset of the OpenCode Server API the relay drives.
///
/// Each method is a single HTTP round trip; no retries.
#[async_trait]
pub trait OpenCodeApi: Send + Sync {
    /// `GET /global/health`
    async fn health(&self) -> Result<HealthInfo, ClientError>;

    /// `GET /session`, in server order.
    async fn list_sessions(&self) -> Result<Vec<Session>, ClientError>;

    /// `POST /session`. `None` lets the server pick the title.
    async fn create_session(&self, title: Option<&str>) -> Result<Session, ClientError>;

    /// `GET /session/{id}`
    async fn get_session(&self, session_id: &str) -> Result<Session, ClientError>;

    /// `POST /session/{id}/message` with a single text part.
    async fn send_message(&self, session_id: &str, text: &str) -> Result<MessageReply, ClientError>;

    /// `GET /command`
    async fn list_commands(&self) -> Result<Vec<CommandInfo>, ClientError>;

    /// `POST /session/{id}/command`. `arguments` is forwarded verbatim.
    async fn execute_command(
        &self,
        session_id: &str,
        command: &str,
        arguments: &str,
    ) -> Result<MessageReply, ClientError>;
}
