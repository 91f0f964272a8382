use std::collections::HashMap;

use crate::models::{BackendReply, BookingPayload, ConversationData, Message, QuickReply};

/// Canonical, render-ready turn list for the currently open conversation.
/// Appends only ever happen at the tail, so optimistic user turns always
/// precede the assistant replies that resolve later.
pub struct MessageStore {
    lead_id: String,
    conversation_id: Option<String>,
    current_step: u32,
    parsed_fields: HashMap<String, serde_json::Value>,
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new(lead_id: &str) -> Self {
        Self {
            lead_id: lead_id.to_string(),
            conversation_id: None,
            current_step: 0,
            parsed_fields: HashMap::new(),
            messages: Vec::new(),
        }
    }

    /// Wholesale replace after fetching history or a disruptive refresh.
    /// The lead id is the store's identity and survives the reload.
    pub fn load(&mut self, data: ConversationData) {
        self.conversation_id = data.conversation_id;
        self.current_step = data.current_step;
        self.parsed_fields = data.parsed_fields;
        self.messages = data.messages;
    }

    pub fn lead_id(&self) -> &str {
        &self.lead_id
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Registry key: the backend-assigned conversation id once known,
    /// the lead id until then.
    pub fn conversation_key(&self) -> &str {
        self.conversation_id.as_deref().unwrap_or(&self.lead_id)
    }

    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    pub fn parsed_fields(&self) -> &HashMap<String, serde_json::Value> {
        &self.parsed_fields
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a user-authored turn before the network call resolves.
    pub fn append_optimistic(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Undoes the optimistic append after a failed send, returning the store
    /// to its pre-send shape.
    pub fn rollback_last(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    pub fn append_assistant(
        &mut self,
        content: &str,
        quick_replies: Vec<QuickReply>,
        booking: Option<BookingPayload>,
    ) -> usize {
        self.messages
            .push(Message::assistant(content, quick_replies, booking));
        self.messages.len() - 1
    }

    /// Replaces the booking payload of one existing message in place. The
    /// message's quick replies are no longer valid once a panel interaction
    /// begins, so they are cleared here.
    pub fn patch_booking_at(&mut self, index: usize, payload: BookingPayload) -> anyhow::Result<()> {
        let message = self
            .messages
            .get_mut(index)
            .ok_or_else(|| anyhow::anyhow!("no message at index {index}"))?;
        message.booking = Some(payload);
        message.quick_replies.clear();
        Ok(())
    }

    /// Strips quick replies from every message; stale chip sets disappear
    /// once any one of them is used.
    pub fn clear_quick_replies(&mut self) {
        for message in &mut self.messages {
            message.quick_replies.clear();
        }
    }

    /// Applies conversation metadata carried on a backend reply. The
    /// conversation id is assigned once and kept; step and parsed fields are
    /// backend-owned and replaced as reported.
    pub fn record_reply_meta(&mut self, reply: &BackendReply) {
        if self.conversation_id.is_none() {
            self.conversation_id = reply.conversation_id.clone();
        }
        if let Some(step) = reply.current_step {
            self.current_step = step;
        }
        if let Some(fields) = &reply.parsed_fields {
            self.parsed_fields = fields.clone();
        }
    }
}
