use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::booking::BookingPayload;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuickReply {
    pub label: String,
    pub value: String,
}

/// One conversation turn. Immutable once appended, except for the booking
/// payload which may be patched in place on the index that carried it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<QuickReply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking: Option<BookingPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl Message {
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
            timestamp: Some(chrono::Utc::now().naive_utc()),
            quick_replies: Vec::new(),
            booking: None,
            audio_url: None,
        }
    }

    pub fn voice() -> Self {
        Self {
            content: "[voice message]".to_string(),
            ..Self::user("")
        }
    }

    pub fn assistant(
        content: &str,
        quick_replies: Vec<QuickReply>,
        booking: Option<BookingPayload>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
            timestamp: Some(chrono::Utc::now().naive_utc()),
            quick_replies,
            booking,
            audio_url: None,
        }
    }
}
