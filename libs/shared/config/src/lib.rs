use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub record_store_url: String,
    pub record_store_api_key: String,
    pub jwt_secret: String,
    /// Canonical clinic record id. Every occupancy read/write filters by this
    /// id explicitly; there is no "first clinic in the store" fallback.
    pub clinic_id: String,
    /// When true, chair assignment refuses to silently evict another patient
    /// or to apply against a stale occupancy version.
    pub strict_assignment: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            record_store_url: env::var("RECORD_STORE_URL")
                .unwrap_or_else(|_| {
                    warn!("RECORD_STORE_URL not set, using empty value");
                    String::new()
                }),
            record_store_api_key: env::var("RECORD_STORE_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("RECORD_STORE_API_KEY not set, using empty value");
                    String::new()
                }),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            clinic_id: env::var("CLINIC_ID")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_ID not set, using empty value");
                    String::new()
                }),
            strict_assignment: env::var("STRICT_ASSIGNMENT")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.record_store_url.is_empty()
            && !self.record_store_api_key.is_empty()
            && !self.jwt_secret.is_empty()
            && !self.clinic_id.is_empty()
    }
}
