use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use axum::Json;
use base64::Engine;
use serde::Deserialize;
use tokio_stream::wrappers::{BroadcastStream, IntervalStream};
use tokio_stream::StreamExt;

use crate::errors::AppError;
use crate::models::{BookingPayload, FlowSnapshot, QuickReply, ReplyMode};
use crate::services::session::{self, RenderState, SessionController};
use crate::state::AppState;

fn session_or_404(state: &AppState, lead_id: &str) -> Result<Arc<SessionController>, AppError> {
    state
        .session(lead_id)
        .ok_or_else(|| AppError::SessionNotFound(lead_id.to_string()))
}

// POST /api/session/:lead_id/open
pub async fn open_session(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
) -> Result<Json<RenderState>, AppError> {
    let ctrl = state.open_session(&lead_id);
    ctrl.open().await.map_err(AppError::Backend)?;

    tracing::info!(lead = %lead_id, "conversation opened");
    Ok(Json(ctrl.render_state()))
}

// GET /api/session/:lead_id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
) -> Result<Json<RenderState>, AppError> {
    let ctrl = session_or_404(&state, &lead_id)?;
    Ok(Json(ctrl.render_state()))
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

// POST /api/session/:lead_id/message
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<RenderState>, AppError> {
    let ctrl = session_or_404(&state, &lead_id)?;
    session::send_text(&ctrl, &body.content)
        .await
        .map_err(AppError::Backend)?;
    Ok(Json(ctrl.render_state()))
}

// POST /api/session/:lead_id/quick-reply
pub async fn select_quick_reply(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
    Json(body): Json<QuickReply>,
) -> Result<Json<RenderState>, AppError> {
    let ctrl = session_or_404(&state, &lead_id)?;
    session::select_quick_reply(&ctrl, body)
        .await
        .map_err(AppError::Backend)?;
    Ok(Json(ctrl.render_state()))
}

// POST /api/session/:lead_id/ai-reply
pub async fn trigger_ai_reply(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
) -> Result<Json<RenderState>, AppError> {
    let ctrl = session_or_404(&state, &lead_id)?;
    session::trigger_ai_reply(&ctrl)
        .await
        .map_err(AppError::Backend)?;
    Ok(Json(ctrl.render_state()))
}

#[derive(Deserialize)]
pub struct VoiceRequest {
    pub audio_base64: String,
}

// POST /api/session/:lead_id/voice
pub async fn send_voice(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
    Json(body): Json<VoiceRequest>,
) -> Result<Json<RenderState>, AppError> {
    let ctrl = session_or_404(&state, &lead_id)?;

    let audio = base64::engine::general_purpose::STANDARD
        .decode(body.audio_base64.as_bytes())
        .map_err(|e| AppError::BadRequest(format!("invalid audio_base64: {e}")))?;

    session::send_voice(&ctrl, audio)
        .await
        .map_err(AppError::Backend)?;
    Ok(Json(ctrl.render_state()))
}

#[derive(Deserialize)]
pub struct ModeRequest {
    pub mode: String,
}

// POST /api/session/:lead_id/mode
pub async fn set_mode(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
    Json(body): Json<ModeRequest>,
) -> Result<Json<RenderState>, AppError> {
    let ctrl = session_or_404(&state, &lead_id)?;
    ctrl.set_mode(ReplyMode::parse(&body.mode));
    Ok(Json(ctrl.render_state()))
}

#[derive(Deserialize)]
pub struct DelayRequest {
    pub seconds: u64,
}

// POST /api/session/:lead_id/delay
pub async fn set_delay(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
    Json(body): Json<DelayRequest>,
) -> Result<Json<RenderState>, AppError> {
    let ctrl = session_or_404(&state, &lead_id)?;
    ctrl.set_delay_seconds(body.seconds);
    Ok(Json(ctrl.render_state()))
}

// POST /api/session/:lead_id/booking/dismiss
pub async fn dismiss_booking(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
) -> Result<Json<RenderState>, AppError> {
    let ctrl = session_or_404(&state, &lead_id)?;
    ctrl.dismiss_booking();
    Ok(Json(ctrl.render_state()))
}

// POST /api/session/:lead_id/booking/reset
pub async fn reset_booking(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
) -> Result<Json<RenderState>, AppError> {
    let ctrl = session_or_404(&state, &lead_id)?;
    ctrl.reset_booking_flow();
    Ok(Json(ctrl.render_state()))
}

#[derive(Deserialize)]
pub struct PatchBookingRequest {
    pub index: usize,
    pub payload: BookingPayload,
}

// POST /api/session/:lead_id/booking/patch
pub async fn patch_booking(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
    Json(body): Json<PatchBookingRequest>,
) -> Result<Json<RenderState>, AppError> {
    let ctrl = session_or_404(&state, &lead_id)?;
    ctrl.patch_booking(body.index, body.payload)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(Json(ctrl.render_state()))
}

// GET /api/session/:lead_id/booking/debug
pub async fn booking_debug(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
) -> Result<Json<FlowSnapshot>, AppError> {
    let ctrl = session_or_404(&state, &lead_id)?;
    Ok(Json(ctrl.debug_snapshot()))
}

// GET /api/session/:lead_id/notifications
pub async fn drain_notifications(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let ctrl = session_or_404(&state, &lead_id)?;
    Ok(Json(
        serde_json::json!({ "notifications": ctrl.drain_notifications() }),
    ))
}

// POST /api/session/:lead_id/close
pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.close_session(&lead_id) {
        return Err(AppError::SessionNotFound(lead_id));
    }
    tracing::info!(lead = %lead_id, "session closed");
    Ok(Json(serde_json::json!({ "ok": true })))
}

// GET /api/session/events — SSE stream
pub async fn events_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events.subscribe();

    let live_stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data).event("session_event")))
        }
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(_)) => None,
    });

    let keepalive_stream = tokio_stream::StreamExt::map(
        IntervalStream::new(tokio::time::interval(Duration::from_secs(30))),
        |_| Ok(Event::default().comment("keepalive")),
    );

    Sse::new(StreamExt::merge(live_stream, keepalive_stream))
}
