use axum::http::{HeaderMap, header};
use console_core::AuditLog;
use console_db::transactional;

use crate::error::ApiError;
use crate::state::AppState;

pub mod audit_logs;
pub mod search;
pub mod status;
pub mod tenant_update;

/// Commits `entry` in its own unit of work.
pub(crate) async fn record(state: &AppState, entry: AuditLog) -> Result<(), ApiError> {
    let event_type = state.event_types.describe(entry.event_type_id).unwrap_or("unknown");
    transactional(&state.db, move |app| async move {
        let mut entry = entry;
        app.audit_logs().create(&mut entry).await
    })
    .await
    .map_err(|err| {
        tracing::error!(%err, event_type, "unable to record the audit log");
        ApiError::from(err)
    })
}

/// `scheme://host/path` of the current request, honoring `x-forwarded-proto`.
pub(crate) fn absolute_url(headers: &HeaderMap, path: &str) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{scheme}://{host}{path}")
}
