use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

pub const COMMIT: &str = match option_env!("BUILD_COMMIT") {
    Some(v) => v,
    None => "unknown",
};

pub const BUILD_TIME: &str = match option_env!("BUILD_TIME") {
    Some(v) => v,
    None => "unknown",
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    commit: &'static str,
    build_time: &'static str,
    start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dev_mode: Option<bool>,
    database_status: String,
    configuration_status: String,
}

/// `GET /api/status`: 503 when the database is unreachable, or when sensitive
/// settings are left at their defaults outside of developer mode.
pub async fn show(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    let dev_mode = state.config.developer_mode;

    let db_error = state.db.ping().await.err();
    let database_status = match &db_error {
        Some(err) => {
            tracing::error!(db_error = %err, "database configuration error");
            format!("Error: {err}")
        }
        None => "OK".to_string(),
    };

    let config_error = state.config.default_configuration_error();
    let configuration_status = match config_error {
        Some(err) => {
            tracing::error!(config_error = err, "configuration error");
            format!("Error: {err}")
        }
        None => "OK".to_string(),
    };

    let status = if db_error.is_some() || (config_error.is_some() && !dev_mode) {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status,
        Json(StatusResponse {
            commit: COMMIT,
            build_time: BUILD_TIME,
            start_time: state.started_at.to_rfc3339(),
            dev_mode: dev_mode.then_some(true),
            database_status,
            configuration_status,
        }),
    )
}
