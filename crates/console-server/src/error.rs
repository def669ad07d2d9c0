use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use console_core::{Error, ErrorKind};
use serde::Serialize;

use crate::security;

/// An error rendered as a JSON-API error document.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    detail: String,
}

#[derive(Debug, Serialize)]
struct ErrorObject {
    status: String,
    code: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorDocument {
    errors: Vec<ErrorObject>,
}

impl ApiError {
    pub fn bad_gateway(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            code: "bad_gateway",
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match err.kind() {
            ErrorKind::InvalidInput => (StatusCode::BAD_REQUEST, "bad_parameter"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            ErrorKind::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ErrorKind::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ErrorKind::Timeout => (StatusCode::INTERNAL_SERVER_ERROR, "timeout"),
        };
        Self {
            status,
            code,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let id = security::current_request_id();
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, code = self.code, detail = %self.detail, "request failed");
        }
        let body = ErrorDocument {
            errors: vec![ErrorObject {
                status: self.status.as_u16().to_string(),
                code: self.code,
                detail: self.detail,
                id,
            }],
        };
        (self.status, Json(body)).into_response()
    }
}
