use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::{
    BackendReply, BookingMode, BookingPayload, FlowSnapshot, FlowStage, Message, QuickReply,
    ReplyMode, Role, SessionEvent,
};
use crate::services::augment::augment_reply;
use crate::services::backend::{BackendApi, OutgoingMessage};
use crate::services::booking_flow::BookingFlowRegistry;
use crate::services::intent::IntentDetector;
use crate::services::scheduler::ReplyScheduler;
use crate::services::store::MessageStore;

/// Auto-reply delay in whole seconds: drawn uniformly from
/// `base ..= base + jitter` to mimic human response variance. Jitter defaults
/// to zero so deployments opt in to the randomness explicitly.
#[derive(Debug, Clone, Copy)]
pub struct DelayRange {
    pub base_secs: u64,
    pub jitter_secs: u64,
}

impl DelayRange {
    pub fn pick(&self) -> Duration {
        if self.jitter_secs == 0 {
            return Duration::from_secs(self.base_secs);
        }
        let secs = rand::thread_rng().gen_range(self.base_secs..=self.base_secs + self.jitter_secs);
        Duration::from_secs(secs)
    }
}

/// Drives one lead's chat thread: optimistic sends with rollback, reply
/// augmentation against the shared booking-flow registry, and the automated
/// reply countdown. One controller exists per open conversation; the
/// registry it writes to outlives it.
pub struct SessionController {
    company_id: String,
    lead_id: String,
    backend: Arc<dyn BackendApi>,
    flows: Arc<BookingFlowRegistry>,
    intent: Arc<dyn IntentDetector>,
    events: broadcast::Sender<SessionEvent>,
    store: Mutex<MessageStore>,
    draft: Mutex<String>,
    notifications: Mutex<Vec<String>>,
    mode: Mutex<ReplyMode>,
    delay: Mutex<DelayRange>,
    scheduler: ReplyScheduler,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderMessage {
    #[serde(flatten)]
    pub message: Message,
    pub booking_interactive: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderState {
    pub lead_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub current_step: u32,
    pub mode: ReplyMode,
    pub draft: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown_seconds: Option<u64>,
    pub messages: Vec<RenderMessage>,
}

impl SessionController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        company_id: String,
        lead_id: String,
        backend: Arc<dyn BackendApi>,
        flows: Arc<BookingFlowRegistry>,
        intent: Arc<dyn IntentDetector>,
        events: broadcast::Sender<SessionEvent>,
        mode: ReplyMode,
        delay: DelayRange,
    ) -> Arc<Self> {
        let store = MessageStore::new(&lead_id);
        Arc::new(Self {
            company_id,
            lead_id,
            backend,
            flows,
            intent,
            events,
            store: Mutex::new(store),
            draft: Mutex::new(String::new()),
            notifications: Mutex::new(Vec::new()),
            mode: Mutex::new(mode),
            delay: Mutex::new(delay),
            scheduler: ReplyScheduler::new(),
        })
    }

    pub fn lead_id(&self) -> &str {
        &self.lead_id
    }

    /// Fetches the conversation history and replaces the store wholesale.
    pub async fn open(&self) -> anyhow::Result<()> {
        let data = self
            .backend
            .get_conversation(&self.company_id, &self.lead_id)
            .await?;
        self.store.lock().unwrap().load(data);
        Ok(())
    }

    pub fn set_mode(&self, mode: ReplyMode) {
        if mode == ReplyMode::Manual {
            self.scheduler.cancel();
        }
        *self.mode.lock().unwrap() = mode;
    }

    pub fn mode(&self) -> ReplyMode {
        *self.mode.lock().unwrap()
    }

    pub fn set_delay_seconds(&self, seconds: u64) {
        self.delay.lock().unwrap().base_secs = seconds;
    }

    pub fn dismiss_booking(&self) {
        let key = self.conversation_key();
        self.flows.flow(&key).lock().unwrap().mark_declined();
        self.publish("booking_dismissed", "");
    }

    pub fn reset_booking_flow(&self) {
        let key = self.conversation_key();
        self.flows.reset(&key);
        self.publish("booking_reset", "");
    }

    /// Applies an in-panel action (slot picked, appointment confirmed) to the
    /// message that rendered the panel, then moves the flow along with it.
    pub fn patch_booking(&self, index: usize, payload: BookingPayload) -> anyhow::Result<()> {
        self.store
            .lock()
            .unwrap()
            .patch_booking_at(index, payload.clone())?;

        let key = self.conversation_key();
        let flow = self.flows.flow(&key);
        {
            let mut state = flow.lock().unwrap();
            match payload.mode {
                BookingMode::Confirmed | BookingMode::BookingSuccess => {
                    state.mark_completed(payload.appointment_id.clone())
                }
                BookingMode::AwaitingSlotChoice => state.mark_awaiting_slots(),
                BookingMode::Declined => state.mark_declined(),
                BookingMode::Offered => {}
            }
        }

        self.publish("booking_updated", payload.mode.as_str());
        Ok(())
    }

    pub fn debug_snapshot(&self) -> FlowSnapshot {
        let key = self.conversation_key();
        self.flows.snapshot(&key)
    }

    pub fn drain_notifications(&self) -> Vec<String> {
        self.notifications
            .lock()
            .map(|mut n| n.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn render_state(&self) -> RenderState {
        let store = self.store.lock().unwrap();
        let snapshot = self.flows.snapshot(store.conversation_key());
        let active_index = active_booking_index(store.messages(), &snapshot);

        let messages = store
            .messages()
            .iter()
            .enumerate()
            .map(|(i, message)| RenderMessage {
                message: message.clone(),
                booking_interactive: Some(i) == active_index,
            })
            .collect();

        RenderState {
            lead_id: store.lead_id().to_string(),
            conversation_id: store.conversation_id().map(str::to_string),
            current_step: store.current_step(),
            mode: self.mode(),
            draft: self.draft.lock().unwrap().clone(),
            countdown_seconds: self
                .scheduler
                .remaining()
                .map(|d| d.as_secs() + u64::from(d.subsec_nanos() > 0)),
            messages,
        }
    }

    /// Releases the countdown on teardown so no timer fires against a closed
    /// conversation.
    pub fn close(&self) {
        self.scheduler.cancel();
    }

    fn conversation_key(&self) -> String {
        self.store.lock().unwrap().conversation_key().to_string()
    }

    fn push_notification(&self, text: &str) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(text.to_string());
        }
        self.publish("notification", text);
    }

    fn publish(&self, kind: &str, content: &str) {
        // Broadcast to SSE subscribers; ignore if no receivers
        let _ = self
            .events
            .send(SessionEvent::new(&self.lead_id, kind, content));
    }

    fn ingest_reply(&self, reply: BackendReply, last_user_message: Option<&str>) {
        let mut store = self.store.lock().unwrap();
        store.record_reply_meta(&reply);

        let flow = self.flows.flow(store.conversation_key());
        let augmented = augment_reply(&reply, &flow, last_user_message, self.intent.as_ref());

        store.append_assistant(&augmented.content, augmented.quick_replies, augmented.booking);
        drop(store);

        self.publish("assistant_reply", &augmented.content);
    }
}

/// Scan from the end: the last message carrying a booking payload is the
/// candidate. It renders interactive only while the flow is still live, or
/// when the candidate itself is a confirmation (a just-completed booking stays
/// visible). Everything earlier is inert history.
fn active_booking_index(messages: &[Message], snapshot: &FlowSnapshot) -> Option<usize> {
    let (index, message) = messages
        .iter()
        .enumerate()
        .rev()
        .find(|(_, m)| m.booking.is_some())?;

    let terminal = matches!(snapshot.stage, FlowStage::Declined | FlowStage::Completed);

    let mode = message.booking.as_ref().map(|b| b.mode)?;
    if !terminal || mode.is_confirmation() {
        Some(index)
    } else {
        None
    }
}

/// Sends typed input through the optimistic append / rollback path. A failed
/// send is recovered locally: the optimistic message is rolled back, the text
/// returns to the draft, and a non-blocking notification is queued.
pub async fn send_text(ctrl: &Arc<SessionController>, content: &str) -> anyhow::Result<()> {
    let content = content.trim();
    if content.is_empty() {
        return Ok(());
    }

    // New user activity invalidates any pending automated trigger.
    ctrl.scheduler.cancel();

    let conversation_id = {
        let mut store = ctrl.store.lock().unwrap();
        store.append_optimistic(Message::user(content));
        store.conversation_id().map(str::to_string)
    };
    ctrl.draft.lock().unwrap().clear();

    let outgoing = OutgoingMessage {
        role: Role::User.as_str().to_string(),
        content: content.to_string(),
        conversation_id,
    };

    match ctrl
        .backend
        .send_message(&ctrl.company_id, &ctrl.lead_id, &outgoing)
        .await
    {
        Ok(reply) => {
            ctrl.ingest_reply(reply, Some(content));
            schedule_auto_reply(ctrl);
        }
        Err(e) => {
            tracing::warn!(error = %e, lead = %ctrl.lead_id, "send failed, rolling back optimistic message");
            ctrl.store.lock().unwrap().rollback_last();
            *ctrl.draft.lock().unwrap() = content.to_string();
            ctrl.push_notification("Message failed to send. Your text was restored; please retry.");
        }
    }

    Ok(())
}

/// Stages the chip's value as outgoing text. Every historical chip set is
/// stripped first so a used set never lingers.
pub async fn select_quick_reply(
    ctrl: &Arc<SessionController>,
    reply: QuickReply,
) -> anyhow::Result<()> {
    ctrl.store.lock().unwrap().clear_quick_replies();
    send_text(ctrl, &reply.value).await
}

/// Requests an AI reply now, manual or scheduler-fired. A failure leaves the
/// conversation unchanged apart from a notification.
pub async fn trigger_ai_reply(ctrl: &Arc<SessionController>) -> anyhow::Result<()> {
    ctrl.scheduler.cancel();

    let last_user_message = {
        let store = ctrl.store.lock().unwrap();
        store
            .messages()
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
    };

    match ctrl.backend.ai_reply(&ctrl.company_id, &ctrl.lead_id).await {
        Ok(reply) => ctrl.ingest_reply(reply, last_user_message.as_deref()),
        Err(e) => {
            tracing::warn!(error = %e, lead = %ctrl.lead_id, "AI reply failed");
            ctrl.push_notification("Couldn't generate an AI reply. Please try again.");
        }
    }

    Ok(())
}

/// Voice goes through the same optimistic path as text; there is no draft to
/// restore for audio.
pub async fn send_voice(ctrl: &Arc<SessionController>, audio: Vec<u8>) -> anyhow::Result<()> {
    ctrl.scheduler.cancel();

    let key = {
        let mut store = ctrl.store.lock().unwrap();
        store.append_optimistic(Message::voice());
        store.conversation_key().to_string()
    };

    match ctrl.backend.send_voice_message(&key, &audio).await {
        Ok(reply) => {
            ctrl.ingest_reply(reply, None);
            schedule_auto_reply(ctrl);
        }
        Err(e) => {
            tracing::warn!(error = %e, lead = %ctrl.lead_id, "voice send failed, rolling back");
            ctrl.store.lock().unwrap().rollback_last();
            ctrl.push_notification("Voice message failed to send. Please retry.");
        }
    }

    Ok(())
}

fn schedule_auto_reply(ctrl: &Arc<SessionController>) {
    if ctrl.mode() != ReplyMode::Automated {
        return;
    }

    let delay = ctrl.delay.lock().unwrap().pick();
    let weak = Arc::downgrade(ctrl);
    ctrl.scheduler.start(delay, async move {
        // The controller may have been torn down while the countdown ran.
        if let Some(ctrl) = weak.upgrade() {
            if let Err(e) = trigger_ai_reply(&ctrl).await {
                tracing::warn!(error = %e, "scheduled AI reply failed");
            }
        }
    });
}
