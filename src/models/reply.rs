use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::models::booking::BookingPayload;
use crate::models::message::QuickReply;

/// Raw reply object from the backend, before augmentation. The booking payload
/// may arrive in one of several locations depending on which backend code path
/// produced the reply; see [`BackendReply::booking_payload`] for the decode order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendReply {
    #[serde(default, alias = "content", alias = "reply")]
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub current_step: Option<u32>,
    #[serde(default)]
    pub parsed_fields: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub quick_replies: Vec<QuickReply>,
    #[serde(default)]
    pub booking: Option<BookingPayload>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub ui_action: Option<Value>,
}

impl BackendReply {
    /// Decodes the backend-computed booking payload, checking the known
    /// locations in priority order:
    ///
    /// 1. top-level `booking`
    /// 2. `metadata.booking`
    /// 3. `ui_action.booking`
    ///
    /// The first location holding a payload that decodes wins; a malformed
    /// payload in one location does not shadow a valid one further down.
    pub fn booking_payload(&self) -> Option<BookingPayload> {
        if let Some(payload) = &self.booking {
            return Some(payload.clone());
        }

        for wrapper in [&self.metadata, &self.ui_action] {
            if let Some(value) = wrapper.as_ref().and_then(|w| w.get("booking")) {
                if let Ok(payload) = serde_json::from_value::<BookingPayload>(value.clone()) {
                    return Some(payload);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::BookingMode;

    #[test]
    fn test_top_level_booking_wins() {
        let reply: BackendReply = serde_json::from_str(
            r#"{
                "message": "hi",
                "booking": {"mode": "offered"},
                "metadata": {"booking": {"mode": "confirmed"}}
            }"#,
        )
        .unwrap();
        assert_eq!(reply.booking_payload().unwrap().mode, BookingMode::Offered);
    }

    #[test]
    fn test_metadata_booking_decoded() {
        let reply: BackendReply = serde_json::from_str(
            r#"{
                "message": "hi",
                "metadata": {"booking": {"mode": "awaiting_slot_choice"}}
            }"#,
        )
        .unwrap();
        assert_eq!(
            reply.booking_payload().unwrap().mode,
            BookingMode::AwaitingSlotChoice
        );
    }

    #[test]
    fn test_ui_action_booking_decoded() {
        let reply: BackendReply = serde_json::from_str(
            r#"{
                "message": "hi",
                "ui_action": {"kind": "show_panel", "booking": {"mode": "booking_success", "appointment_id": "apt-9"}}
            }"#,
        )
        .unwrap();
        let payload = reply.booking_payload().unwrap();
        assert_eq!(payload.mode, BookingMode::BookingSuccess);
        assert_eq!(payload.appointment_id.as_deref(), Some("apt-9"));
    }

    #[test]
    fn test_malformed_location_does_not_shadow() {
        let reply: BackendReply = serde_json::from_str(
            r#"{
                "message": "hi",
                "metadata": {"booking": {"mode": "not_a_mode"}},
                "ui_action": {"booking": {"mode": "offered"}}
            }"#,
        )
        .unwrap();
        assert_eq!(reply.booking_payload().unwrap().mode, BookingMode::Offered);
    }

    #[test]
    fn test_no_booking_anywhere() {
        let reply: BackendReply =
            serde_json::from_str(r#"{"message": "just text"}"#).unwrap();
        assert!(reply.booking_payload().is_none());
    }

    #[test]
    fn test_content_alias() {
        let reply: BackendReply =
            serde_json::from_str(r#"{"content": "aliased"}"#).unwrap();
        assert_eq!(reply.message, "aliased");
    }
}
