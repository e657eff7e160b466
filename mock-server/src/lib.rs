//! Local HTTP server used to exercise the request client in tests.
//!
//! Every route reflects some part of the request back so tests can verify
//! what actually went over the wire: `/echo` returns the request body and
//! content type, `/headers` returns all request headers as JSON,
//! `/cookies/*` set and reveal cookies, `/status/{code}` answers with an
//! arbitrary status, `/auth/basic` checks a fixed credential, and
//! `/redirect` bounces to `/ping`.

use std::collections::HashMap;

use axum::{
    extract::Path,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;

/// Credential accepted by `/auth/basic`: `user:pass`, base64-encoded.
const ACCEPTED_AUTHORIZATION: &str = "Basic dXNlcjpwYXNz";

pub fn app() -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/echo", post(echo))
        .route("/headers", get(show_headers))
        .route("/cookies/set", get(set_cookie))
        .route("/cookies/show", get(show_cookie))
        .route("/status/{code}", get(status))
        .route("/auth/basic", get(basic_auth))
        .route("/redirect", get(redirect))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn ping() -> &'static str {
    "pong"
}

/// Echo the request body back, preserving the request's content type.
async fn echo(headers: HeaderMap, body: String) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    ([(header::CONTENT_TYPE, content_type)], body)
}

/// Return all request headers as a JSON object (names lowercased by axum).
async fn show_headers(headers: HeaderMap) -> Json<HashMap<String, String>> {
    let map = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(map)
}

/// Set a persistent cookie. Max-Age makes it eligible for jar persistence.
async fn set_cookie() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, "session=abc123; Path=/; Max-Age=3600")],
        "cookie set",
    )
}

/// Return the raw `Cookie` request header, or an empty body when absent.
async fn show_cookie(headers: HeaderMap) -> String {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn basic_auth(headers: HeaderMap) -> (StatusCode, &'static str) {
    match headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        Some(value) if value == ACCEPTED_AUTHORIZATION => (StatusCode::OK, "welcome"),
        _ => (StatusCode::UNAUTHORIZED, "unauthorized"),
    }
}

async fn redirect() -> Redirect {
    Redirect::temporary("/ping")
}
