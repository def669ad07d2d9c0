use axum::{
    Extension, Json,
    body::Bytes,
    extract::{OriginalUri, Path, Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode},
};
use console_core::{
    AuditLog, Error, EventParams, EventType,
    paging::{PagingLinks, compute_paging_limits},
};
use console_db::transactional;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::handlers::{absolute_url, record};
use crate::identity::Identity;
use crate::state::AppState;

const AUDIT_LOGS_TYPE: &str = "audit_logs";

#[derive(Debug, Deserialize)]
pub struct CreateAuditLogPayload {
    data: CreateAuditLogData,
}

#[derive(Debug, Deserialize)]
struct CreateAuditLogData {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    attributes: CreateAuditLogAttributes,
}

#[derive(Debug, Deserialize)]
struct CreateAuditLogAttributes {
    event_type: String,
    #[serde(default)]
    event_params: Option<EventParams>,
}

/// `POST /api/auditlogs/users/:username`: records an event reported by another
/// service on behalf of `username`.
pub async fn create(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let payload: CreateAuditLogPayload = serde_json::from_slice(&body)
        .map_err(|e| Error::invalid_input("data", format!("invalid audit log payload: {e}")))?;
    if let Some(kind) = payload.data.kind.as_deref().filter(|k| *k != AUDIT_LOGS_TYPE) {
        return Err(Error::bad_parameter("type", kind).into());
    }

    let attributes = payload.data.attributes;
    let event_type_id = state
        .event_types
        .resolve(&attributes.event_type)
        .ok_or_else(|| Error::bad_parameter("event_type", &attributes.event_type))?;

    tracing::info!(%username, event_type = %attributes.event_type, "creating audit log for user");
    record(
        &state,
        AuditLog::for_username(
            username,
            event_type_id,
            attributes.event_params.unwrap_or_default(),
        ),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(rename = "page[start]")]
    start: Option<i64>,
    #[serde(rename = "page[size]")]
    size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AuditLogList {
    data: Vec<AuditLogData>,
    links: PagingLinks,
    meta: ListMeta,
}

#[derive(Debug, Serialize)]
struct AuditLogData {
    #[serde(rename = "type")]
    kind: &'static str,
    attributes: AuditLogAttributes,
}

#[derive(Debug, Serialize)]
struct AuditLogAttributes {
    date: String,
    event_type: String,
    event_params: EventParams,
}

#[derive(Debug, Serialize)]
struct ListMeta {
    #[serde(rename = "totalCount")]
    total_count: u64,
}

/// `GET /api/auditlogs/users/:username`: lists the entries recorded for
/// `username`. The listing itself is audited for the caller.
pub async fn list_for_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(username): Path<String>,
    page: Result<Query<PageQuery>, QueryRejection>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<Json<AuditLogList>, ApiError> {
    let Query(page) = page.map_err(|rejection| {
        tracing::error!(%rejection, "invalid paging parameters");
        Error::invalid_input("page", rejection.body_text())
    })?;
    let requester = identity.username.clone().ok_or_else(|| {
        tracing::error!(identity_id = %identity.id, "token is missing 'preferred_username' claim");
        Error::Unauthorized("bad or missing token".to_string())
    })?;

    let mut params = EventParams::new();
    params.insert("user".to_string(), Value::String(username.clone()));
    record(
        &state,
        AuditLog::for_username(
            requester,
            state.event_types.id(EventType::ListAuditLogs),
            params,
        ),
    )
    .await?;

    let (start, size) = compute_paging_limits(page.start, page.size);
    let target = username.clone();
    let page_result = transactional(&state.db, move |app| async move {
        app.audit_logs().list_by_username(&target, start, size).await
    })
    .await
    .map_err(|err| {
        tracing::error!(%err, %username, "unable to list auditlogs for user");
        ApiError::from(err)
    })?;

    let data = page_result
        .items
        .into_iter()
        .map(|entry| AuditLogData {
            kind: AUDIT_LOGS_TYPE,
            attributes: AuditLogAttributes {
                date: entry
                    .created_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
                event_type: state
                    .event_types
                    .describe(entry.event_type_id)
                    .unwrap_or_default()
                    .to_string(),
                event_params: entry.event_params,
            },
        })
        .collect::<Vec<_>>();

    let path = absolute_url(&headers, uri.path());
    let links = PagingLinks::build(&path, data.len(), start, size, page_result.total, &[]);

    Ok(Json(AuditLogList {
        data,
        links,
        meta: ListMeta {
            total_count: page_result.total,
        },
    }))
}
