use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub backend_url: String,
    pub backend_api_key: String,
    pub company_id: String,
    pub reply_mode: String,
    pub reply_delay_secs: u64,
    pub reply_delay_jitter_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            backend_url: env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api".to_string()),
            backend_api_key: env::var("BACKEND_API_KEY").unwrap_or_default(),
            company_id: env::var("COMPANY_ID").unwrap_or_else(|_| "default".to_string()),
            reply_mode: env::var("REPLY_MODE").unwrap_or_else(|_| "manual".to_string()),
            reply_delay_secs: env::var("REPLY_DELAY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            reply_delay_jitter_secs: env::var("REPLY_DELAY_JITTER_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }
}
