use std::sync::Arc;

use chrono::{DateTime, Utc};
use console_core::EventTypes;
use console_db::SeaOrmApplication;

use crate::config::Config;
use crate::identity::TokenVerifier;

#[derive(Clone)]
pub struct AppState {
    pub db: SeaOrmApplication,
    pub event_types: Arc<EventTypes>,
    pub config: Arc<Config>,
    pub verifier: Arc<TokenVerifier>,
    pub http: reqwest::Client,
    pub started_at: DateTime<Utc>,
}
