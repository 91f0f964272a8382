pub mod http;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::{BackendReply, ConversationData};

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// The dashboard backend, consumed as opaque request/response operations.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn get_conversation(
        &self,
        company_id: &str,
        lead_id: &str,
    ) -> anyhow::Result<ConversationData>;

    async fn send_message(
        &self,
        company_id: &str,
        lead_id: &str,
        outgoing: &OutgoingMessage,
    ) -> anyhow::Result<BackendReply>;

    async fn ai_reply(&self, company_id: &str, lead_id: &str) -> anyhow::Result<BackendReply>;

    async fn send_voice_message(
        &self,
        conversation_key: &str,
        audio: &[u8],
    ) -> anyhow::Result<BackendReply>;
}
