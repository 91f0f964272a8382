use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::message::Message;

/// Conversation history as fetched from the backend. The conversation id is
/// assigned by the backend on the first exchange and may be absent initially.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationData {
    pub lead_id: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub current_step: u32,
    #[serde(default)]
    pub parsed_fields: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    Manual,
    Automated,
}

impl ReplyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyMode::Manual => "manual",
            ReplyMode::Automated => "automated",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "automated" => ReplyMode::Automated,
            _ => ReplyMode::Manual,
        }
    }
}
