use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use leadchat::config::AppConfig;
use leadchat::handlers;
use leadchat::services::backend::http::HttpBackendClient;
use leadchat::services::intent::KeywordIntentDetector;
use leadchat::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    tracing::info!(
        backend = %config.backend_url,
        company = %config.company_id,
        mode = %config.reply_mode,
        "starting conversation session engine"
    );

    let backend = Arc::new(HttpBackendClient::new(
        config.backend_url.clone(),
        config.backend_api_key.clone(),
    ));

    let state = Arc::new(AppState::new(
        config.clone(),
        backend,
        Arc::new(KeywordIntentDetector),
    ));

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/session/:lead_id/open",
            post(handlers::session::open_session),
        )
        .route("/api/session/:lead_id", get(handlers::session::get_session))
        .route(
            "/api/session/:lead_id/message",
            post(handlers::session::send_message),
        )
        .route(
            "/api/session/:lead_id/quick-reply",
            post(handlers::session::select_quick_reply),
        )
        .route(
            "/api/session/:lead_id/ai-reply",
            post(handlers::session::trigger_ai_reply),
        )
        .route(
            "/api/session/:lead_id/voice",
            post(handlers::session::send_voice),
        )
        .route(
            "/api/session/:lead_id/mode",
            post(handlers::session::set_mode),
        )
        .route(
            "/api/session/:lead_id/delay",
            post(handlers::session::set_delay),
        )
        .route(
            "/api/session/:lead_id/booking/dismiss",
            post(handlers::session::dismiss_booking),
        )
        .route(
            "/api/session/:lead_id/booking/reset",
            post(handlers::session::reset_booking),
        )
        .route(
            "/api/session/:lead_id/booking/patch",
            post(handlers::session::patch_booking),
        )
        .route(
            "/api/session/:lead_id/booking/debug",
            get(handlers::session::booking_debug),
        )
        .route(
            "/api/session/:lead_id/notifications",
            get(handlers::session::drain_notifications),
        )
        .route(
            "/api/session/:lead_id/close",
            post(handlers::session::close_session),
        )
        .route(
            "/api/session/events",
            get(handlers::session::events_stream),
        )
        .route("/dev", get(handlers::dev::dev_page))
        .route("/api/dev/config", get(handlers::dev::dev_config))
        .route("/api/dev/new-lead", get(handlers::dev::new_lead))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
