use axum::{
    Extension,
    extract::{Query, Request, State},
    response::Response,
};
use console_core::{AuditLog, Error, EventParams, EventType};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::handlers::record;
use crate::identity::Identity;
use crate::proxy;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

/// `GET /api/search/users`: audit the query, then hand the search to the auth service.
pub async fn search_users(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<SearchQuery>,
    req: Request,
) -> Result<Response, ApiError> {
    let q = query
        .q
        .ok_or_else(|| Error::invalid_input("q", "missing required query parameter"))?;

    let mut params = EventParams::new();
    params.insert("query".to_string(), Value::String(q));
    record(
        &state,
        AuditLog::for_identity(
            identity.id,
            state.event_types.id(EventType::UserSearch),
            params,
        ),
    )
    .await?;

    proxy::forward(&state.http, &state.config.auth_url, "/api/search/users", req).await
}
