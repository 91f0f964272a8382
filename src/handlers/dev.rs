use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::Json;

use crate::state::AppState;

static DEV_CHAT_HTML: &str = include_str!("../web/dev_chat.html");

pub async fn dev_page() -> Html<&'static str> {
    Html(DEV_CHAT_HTML)
}

// GET /api/dev/config
pub async fn dev_config(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "company_id": state.config.company_id,
        "reply_mode": state.config.reply_mode,
        "reply_delay_secs": state.config.reply_delay_secs,
        "reply_delay_jitter_secs": state.config.reply_delay_jitter_secs,
    }))
}

// GET /api/dev/new-lead
pub async fn new_lead() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "lead_id": uuid::Uuid::new_v4().to_string() }))
}
