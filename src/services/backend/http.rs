use anyhow::Context;
use async_trait::async_trait;

use super::{BackendApi, OutgoingMessage};
use crate::models::{BackendReply, ConversationData};

pub struct HttpBackendClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpBackendClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
        what: &str,
    ) -> anyhow::Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("backend error ({status}) on {what}: {body}");
        }
        resp.json()
            .await
            .with_context(|| format!("failed to parse {what} response"))
    }
}

#[async_trait]
impl BackendApi for HttpBackendClient {
    async fn get_conversation(
        &self,
        company_id: &str,
        lead_id: &str,
    ) -> anyhow::Result<ConversationData> {
        let url = format!(
            "{}/companies/{company_id}/leads/{lead_id}/conversation",
            self.base_url
        );

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("failed to fetch conversation")?;

        Self::decode(resp, "get_conversation").await
    }

    async fn send_message(
        &self,
        company_id: &str,
        lead_id: &str,
        outgoing: &OutgoingMessage,
    ) -> anyhow::Result<BackendReply> {
        let url = format!(
            "{}/companies/{company_id}/leads/{lead_id}/messages",
            self.base_url
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(outgoing)
            .send()
            .await
            .context("failed to send message")?;

        Self::decode(resp, "send_message").await
    }

    async fn ai_reply(&self, company_id: &str, lead_id: &str) -> anyhow::Result<BackendReply> {
        let url = format!(
            "{}/companies/{company_id}/leads/{lead_id}/ai-reply",
            self.base_url
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("failed to request AI reply")?;

        Self::decode(resp, "ai_reply").await
    }

    async fn send_voice_message(
        &self,
        conversation_key: &str,
        audio: &[u8],
    ) -> anyhow::Result<BackendReply> {
        let url = format!("{}/conversations/{conversation_key}/voice", self.base_url);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/octet-stream")
            .body(audio.to_vec())
            .send()
            .await
            .context("failed to send voice message")?;

        Self::decode(resp, "send_voice_message").await
    }
}
