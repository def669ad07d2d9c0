pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod proxy;
pub mod security;
pub mod state;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::handlers::{audit_logs, search, status, tenant_update};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    // Everything but the status endpoint needs a bearer access token.
    let protected = Router::new()
        .route("/api/search/users", get(search::search_users))
        .route(
            "/api/tenants/update",
            get(tenant_update::show)
                .post(tenant_update::start)
                .delete(tenant_update::stop),
        )
        .route(
            "/api/auditlogs/users/:username",
            post(audit_logs::create).get(audit_logs::list_for_user),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            security::require_identity,
        ));

    Router::new()
        .route("/api/status", get(status::show))
        .merge(protected)
        .layer(middleware::from_fn(security::request_id))
        .with_state(state)
}
