use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::models::{ReplyMode, SessionEvent};
use crate::services::backend::BackendApi;
use crate::services::booking_flow::BookingFlowRegistry;
use crate::services::intent::IntentDetector;
use crate::services::session::{DelayRange, SessionController};

pub struct AppState {
    pub config: AppConfig,
    pub backend: Arc<dyn BackendApi>,
    pub flows: Arc<BookingFlowRegistry>,
    pub intent: Arc<dyn IntentDetector>,
    pub sessions: Mutex<HashMap<String, Arc<SessionController>>>,
    pub events: broadcast::Sender<SessionEvent>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        backend: Arc<dyn BackendApi>,
        intent: Arc<dyn IntentDetector>,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            config,
            backend,
            flows: Arc::new(BookingFlowRegistry::new()),
            intent,
            sessions: Mutex::new(HashMap::new()),
            events,
        }
    }

    pub fn session(&self, lead_id: &str) -> Option<Arc<SessionController>> {
        self.sessions.lock().unwrap().get(lead_id).cloned()
    }

    /// One controller per open conversation; repeated opens reuse it so
    /// re-renders and background polling share the same state.
    pub fn open_session(&self, lead_id: &str) -> Arc<SessionController> {
        let mut sessions = self.sessions.lock().unwrap();
        Arc::clone(sessions.entry(lead_id.to_string()).or_insert_with(|| {
            SessionController::new(
                self.config.company_id.clone(),
                lead_id.to_string(),
                Arc::clone(&self.backend),
                Arc::clone(&self.flows),
                Arc::clone(&self.intent),
                self.events.clone(),
                ReplyMode::parse(&self.config.reply_mode),
                DelayRange {
                    base_secs: self.config.reply_delay_secs,
                    jitter_secs: self.config.reply_delay_jitter_secs,
                },
            )
        }))
    }

    pub fn close_session(&self, lead_id: &str) -> bool {
        match self.sessions.lock().unwrap().remove(lead_id) {
            Some(ctrl) => {
                ctrl.close();
                true
            }
            None => false,
        }
    }
}
