//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Bodies longer than this many bytes are truncated in the `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Form fields whose values never reach the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "confirm_password"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Password fields in form submissions are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let Some(body) = read_body(body).await else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    if is_form(&parts.headers) {
        let form_text = String::from_utf8_lossy(&body);
        let redacted = REDACTED_FIELDS
            .iter()
            .fold(form_text.to_string(), |text, field| redact_field(&text, field));
        log_body("Received request", &parts, &redacted);
    } else {
        log_body("Received request", &parts, &describe_body(&parts.headers, &body));
    }

    let response = next.run(Request::from_parts(parts, Body::from(body))).await;

    let (parts, body) = response.into_parts();
    let Some(body) = read_body(body).await else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    log_body("Sending response", &parts, &describe_body(&parts.headers, &body));

    Response::from_parts(parts, Body::from(body))
}

async fn read_body(body: Body) -> Option<Bytes> {
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => Some(bytes),
        Err(error) => {
            tracing::error!("Could not read body: {error}");
            None
        }
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// Text bodies are logged as-is, anything else (e.g. PNG charts) by size.
fn describe_body(headers: &HeaderMap, body: &Bytes) -> String {
    let is_binary = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("image/"));

    if is_binary {
        format!("<{} bytes>", body.len())
    } else {
        String::from_utf8_lossy(body).to_string()
    }
}

/// Replace the value of `field_name` in URL encoded `form_text` with asterisks.
fn redact_field(form_text: &str, field_name: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if name == field_name => format!("{name}=********"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// The longest prefix of `text` that fits in [LOG_BODY_LENGTH_LIMIT] bytes
/// without splitting a character.
fn truncate(text: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(text.len());

    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_body(prefix: &str, parts: &impl std::fmt::Debug, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("{prefix}: {parts:#?}\nbody: {}...", truncate(body));
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{prefix}: {parts:#?}\nbody: {body:?}");
    }
}
