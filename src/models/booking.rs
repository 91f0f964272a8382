use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum BookingMode {
    Offered,
    AwaitingSlotChoice,
    Confirmed,
    BookingSuccess,
    Declined,
}

impl BookingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingMode::Offered => "offered",
            BookingMode::AwaitingSlotChoice => "awaiting_slot_choice",
            BookingMode::Confirmed => "confirmed",
            BookingMode::BookingSuccess => "booking_success",
            BookingMode::Declined => "declined",
        }
    }

    /// Confirmation modes stay visible even after the flow turns terminal.
    pub fn is_confirmation(&self) -> bool {
        matches!(self, BookingMode::Confirmed | BookingMode::BookingSuccess)
    }
}

/// UI-facing booking projection attached to a message. The appointment and
/// slot blobs come from the BookingPanel collaborator and are carried opaquely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingPayload {
    pub mode: BookingMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_slot: Option<serde_json::Value>,
}

impl BookingPayload {
    pub fn offered() -> Self {
        Self {
            mode: BookingMode::Offered,
            appointment_id: None,
            appointment: None,
            confirmed_slot: None,
        }
    }
}
