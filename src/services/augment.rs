use std::sync::{Arc, Mutex};

use crate::models::{BackendReply, BookingFlowState, BookingMode, BookingPayload, QuickReply};
use crate::services::intent::IntentDetector;

/// A backend reply after the booking-flow merge, ready to append to the store.
#[derive(Debug, Clone)]
pub struct AugmentedReply {
    pub content: String,
    pub quick_replies: Vec<QuickReply>,
    pub booking: Option<BookingPayload>,
}

/// Merges a raw backend reply with the conversation's booking flow.
///
/// Augmentation is a best-effort enhancement: any internal failure degrades to
/// the unaugmented reply so the text always reaches the store.
pub fn augment_reply(
    reply: &BackendReply,
    flow: &Arc<Mutex<BookingFlowState>>,
    last_user_message: Option<&str>,
    intent: &dyn IntentDetector,
) -> AugmentedReply {
    match try_augment(reply, flow, last_user_message, intent) {
        Ok(augmented) => augmented,
        Err(e) => {
            tracing::warn!(error = %e, "reply augmentation failed, passing reply through");
            passthrough(reply)
        }
    }
}

fn try_augment(
    reply: &BackendReply,
    flow: &Arc<Mutex<BookingFlowState>>,
    last_user_message: Option<&str>,
    intent: &dyn IntentDetector,
) -> anyhow::Result<AugmentedReply> {
    let mut state = flow
        .lock()
        .map_err(|_| anyhow::anyhow!("booking flow lock poisoned"))?;

    // Resolved flows are never re-offered; the reply goes through untouched.
    if state.is_terminal() {
        return Ok(passthrough(reply));
    }

    // A backend-computed payload wins over local heuristics. The stage
    // mutation lands before we return, so a concurrent flow read reflects
    // the new stage as soon as the enriched reply exists.
    if let Some(payload) = reply.booking_payload() {
        apply_payload_stage(&mut state, &payload);
        return Ok(AugmentedReply {
            content: reply.message.clone(),
            quick_replies: reply.quick_replies.clone(),
            booking: Some(payload),
        });
    }

    if !state.offer_shown && intent.booking_intent(&reply.message, last_user_message) {
        state.mark_offered("intent_heuristic");
        return Ok(AugmentedReply {
            content: reply.message.clone(),
            quick_replies: reply.quick_replies.clone(),
            booking: Some(BookingPayload::offered()),
        });
    }

    Ok(passthrough(reply))
}

fn apply_payload_stage(state: &mut BookingFlowState, payload: &BookingPayload) {
    match payload.mode {
        BookingMode::Offered => state.mark_offered("backend_payload"),
        BookingMode::AwaitingSlotChoice => state.mark_awaiting_slots(),
        BookingMode::Confirmed | BookingMode::BookingSuccess => {
            state.mark_completed(payload.appointment_id.clone())
        }
        BookingMode::Declined => state.mark_declined(),
    }
}

fn passthrough(reply: &BackendReply) -> AugmentedReply {
    AugmentedReply {
        content: reply.message.clone(),
        quick_replies: reply.quick_replies.clone(),
        booking: None,
    }
}
