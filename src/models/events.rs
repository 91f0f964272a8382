use serde::Serialize;

/// Broadcast to SSE subscribers whenever a session changes in a way the UI
/// should hear about without polling.
#[derive(Clone, Debug, Serialize)]
pub struct SessionEvent {
    pub lead_id: String,
    pub kind: String,
    pub content: String,
    pub created_at: String,
}

impl SessionEvent {
    pub fn new(lead_id: &str, kind: &str, content: &str) -> Self {
        Self {
            lead_id: lead_id.to_string(),
            kind: kind.to_string(),
            content: content.to_string(),
            created_at: chrono::Utc::now()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        }
    }
}
