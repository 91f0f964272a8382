use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FlowStage {
    Idle,
    Offered,
    AwaitingSlotChoice,
    Declined,
    Completed,
}

impl FlowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStage::Idle => "idle",
            FlowStage::Offered => "offered",
            FlowStage::AwaitingSlotChoice => "awaiting_slot_choice",
            FlowStage::Declined => "declined",
            FlowStage::Completed => "completed",
        }
    }
}

/// Booking-offer progress for one conversation key. Mutated only through the
/// transition methods below; terminal stages are sticky until an explicit reset.
#[derive(Debug, Clone)]
pub struct BookingFlowState {
    pub stage: FlowStage,
    pub offer_shown: bool,
    pub completed: bool,
    pub appointment_id: Option<String>,
    pub stage_reason: Option<String>,
}

impl Default for BookingFlowState {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingFlowState {
    pub fn new() -> Self {
        Self {
            stage: FlowStage::Idle,
            offer_shown: false,
            completed: false,
            appointment_id: None,
            stage_reason: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.completed || matches!(self.stage, FlowStage::Declined | FlowStage::Completed)
    }

    pub fn mark_offered(&mut self, reason: &str) {
        if self.is_terminal() {
            return;
        }
        self.stage = FlowStage::Offered;
        self.offer_shown = true;
        self.stage_reason = Some(reason.to_string());
    }

    pub fn mark_awaiting_slots(&mut self) {
        if self.is_terminal() {
            return;
        }
        self.stage = FlowStage::AwaitingSlotChoice;
        self.offer_shown = true;
        self.stage_reason = Some("slot_options_presented".to_string());
    }

    pub fn mark_completed(&mut self, appointment_id: Option<String>) {
        if self.is_terminal() {
            return;
        }
        self.stage = FlowStage::Completed;
        self.completed = true;
        self.appointment_id = appointment_id;
        self.stage_reason = Some("appointment_confirmed".to_string());
    }

    pub fn mark_declined(&mut self) {
        if self.is_terminal() {
            return;
        }
        self.stage = FlowStage::Declined;
        self.stage_reason = Some("user_dismissed".to_string());
    }

    /// Operator escape hatch: back to idle, offer and completion cleared.
    pub fn reset(&mut self) {
        *self = Self::new();
        self.stage_reason = Some("reset".to_string());
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            stage: self.stage,
            offered: self.offer_shown,
            awaiting_slot_selection: self.stage == FlowStage::AwaitingSlotChoice,
            dismissed: self.stage == FlowStage::Declined,
            booked_appointment_id: self.appointment_id.clone(),
            stage_reason: self.stage_reason.clone(),
        }
    }
}

/// Read-only projection of a flow entry for the debug panel.
#[derive(Debug, Clone, Serialize)]
pub struct FlowSnapshot {
    pub stage: FlowStage,
    pub offered: bool,
    pub awaiting_slot_selection: bool,
    pub dismissed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booked_appointment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_reason: Option<String>,
}
