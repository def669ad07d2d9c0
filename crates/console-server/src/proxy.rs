//! Forwarding of authenticated requests to the upstream services.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, header},
    response::Response,
};
use console_core::Error;

use crate::error::ApiError;

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const NOT_FORWARDED: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

fn strip_connection_headers(headers: &mut HeaderMap) {
    for name in NOT_FORWARDED {
        headers.remove(name);
    }
}

/// Sends `req` to `{base_url}{path}`, keeping its method, query string, headers
/// (`Authorization` included) and body, and relays the upstream response as is.
///
/// An unreachable upstream yields `502 Bad Gateway`.
pub async fn forward(
    client: &reqwest::Client,
    base_url: &str,
    path: &str,
    req: Request,
) -> Result<Response, ApiError> {
    let (parts, body) = req.into_parts();

    let mut url = format!("{}{}", base_url.trim_end_matches('/'), path);
    if let Some(query) = parts.uri.query() {
        url.push('?');
        url.push_str(query);
    }

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| Error::invalid_input("body", e.to_string()))?;

    let mut headers = parts.headers;
    strip_connection_headers(&mut headers);
    headers.remove(header::HOST);

    tracing::debug!(%url, method = %parts.method, "forwarding request upstream");
    let upstream = client
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            tracing::error!(%url, err = %e, "upstream request failed");
            ApiError::bad_gateway(format!("unable to reach {base_url}"))
        })?;

    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_connection_headers(&mut headers);
    let bytes = upstream.bytes().await.map_err(|e| {
        tracing::error!(%url, err = %e, "failed to read upstream response");
        ApiError::bad_gateway(format!("invalid response from {base_url}"))
    })?;

    let mut res = Response::new(Body::from(bytes));
    *res.status_mut() = status;
    *res.headers_mut() = headers;
    Ok(res)
}
