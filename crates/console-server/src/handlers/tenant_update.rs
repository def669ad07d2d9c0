use axum::{
    Extension,
    extract::{Query, Request, State},
    response::Response,
};
use console_core::{AuditLog, EventParams, EventType};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::handlers::record;
use crate::identity::Identity;
use crate::proxy;
use crate::state::AppState;

const TENANT_UPDATE_PATH: &str = "/api/update";

#[derive(Debug, Default, Deserialize)]
pub struct TenantUpdateQuery {
    cluster_url: Option<String>,
    env_type: Option<String>,
}

impl TenantUpdateQuery {
    fn into_params(self) -> EventParams {
        let mut params = EventParams::new();
        if let Some(url) = self.cluster_url {
            params.insert("clusterURL".to_string(), Value::String(url));
        }
        if let Some(env) = self.env_type {
            params.insert("envType".to_string(), Value::String(env));
        }
        params
    }
}

async fn audit_and_forward(
    state: AppState,
    identity: Identity,
    kind: EventType,
    params: EventParams,
    req: Request,
) -> Result<Response, ApiError> {
    record(
        &state,
        AuditLog::for_identity(identity.id, state.event_types.id(kind), params),
    )
    .await?;
    proxy::forward(&state.http, &state.config.tenant_url, TENANT_UPDATE_PATH, req).await
}

/// `GET /api/tenants/update`: information about the ongoing tenant update.
pub async fn show(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<TenantUpdateQuery>,
    req: Request,
) -> Result<Response, ApiError> {
    let params = query.into_params();
    audit_and_forward(state, identity, EventType::ShowTenantUpdate, params, req).await
}

/// `POST /api/tenants/update`: starts a tenant update.
pub async fn start(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<TenantUpdateQuery>,
    req: Request,
) -> Result<Response, ApiError> {
    let params = query.into_params();
    audit_and_forward(state, identity, EventType::StartTenantUpdate, params, req).await
}

/// `DELETE /api/tenants/update`: stops the ongoing tenant update.
pub async fn stop(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    req: Request,
) -> Result<Response, ApiError> {
    audit_and_forward(state, identity, EventType::StopTenantUpdate, EventParams::new(), req).await
}
