//! Executes one configured request against the network.
//!
//! # Design
//! [`run`] performs exactly one blocking request/response cycle and always
//! returns a [`ResponseResult`] — transport failures are captured on the
//! result, never raised. A fresh ureq agent is built per call so agent-level
//! settings (timeouts, TLS, cookie jar) always reflect the configuration
//! being executed. ureq speaks HTTP/1.1 only, follows redirects (capped at 5
//! here), and decompresses gzip transparently.
//!
//! There are no retries and no cancellation beyond the configured timeouts;
//! callers wanting concurrent requests run each config on its own thread.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read as _};
use std::path::Path;
use std::time::Instant;

use base64::{engine::general_purpose, Engine as _};
use http::Method;
use tracing::{debug, warn};

use crate::config::RequestConfig;
use crate::response::ResponseResult;

const MAX_REDIRECTS: u32 = 5;

/// Perform one blocking request/response cycle for `config`.
///
/// The returned result carries either a completed response (status, raw
/// header block, body, elapsed time) or a transport error string with
/// status 0. Executing the same config again re-derives the payload from
/// the stored body, so repeated runs behave identically.
pub fn run(config: &RequestConfig) -> ResponseResult {
    let agent = build_agent(config);

    if let Some(path) = config.cookie_jar_path() {
        load_cookie_jar(&agent, path);
    }

    debug!(url = config.url(), "sending request");

    let started = Instant::now();
    let outcome = send(&agent, config);
    let elapsed = started.elapsed().as_secs_f64();

    match outcome {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            let mut body_text = String::new();
            if let Err(e) = body.into_reader().read_to_string(&mut body_text) {
                debug!(error = %e, "failed reading response body");
                return ResponseResult::failed(format!("failed to read response body: {e}"), elapsed);
            }

            if let Some(path) = config.cookie_jar_path() {
                save_cookie_jar(&agent, path);
            }

            let status = parts.status.as_u16();
            debug!(status, elapsed, "request completed");
            ResponseResult::completed(status, raw_header_block(&parts), body_text, elapsed)
        }
        Err(error) => {
            debug!(%error, elapsed, "transport error");
            ResponseResult::failed(error, elapsed)
        }
    }
}

fn build_agent(config: &RequestConfig) -> ureq::Agent {
    let mut builder = ureq::Agent::config_builder()
        .timeout_global(Some(config.timeout()))
        .timeout_connect(Some(config.connect_timeout()))
        .max_redirects(MAX_REDIRECTS)
        // Non-2xx statuses come back as data; the caller interprets them.
        .http_status_as_error(false);

    if let Some(user_agent) = config.user_agent() {
        builder = builder.user_agent(user_agent);
    }

    if !config.tls_verify() {
        builder = builder.tls_config(
            ureq::tls::TlsConfig::builder()
                .disable_verification(true)
                .build(),
        );
    }

    builder.build().new_agent()
}

/// Build the `http::Request` for ureq's `Agent::run` and execute it once.
fn send(agent: &ureq::Agent, config: &RequestConfig) -> Result<http::Response<ureq::Body>, String> {
    let method = config.method().cloned().unwrap_or(Method::GET);

    let mut builder = http::Request::builder().method(method).uri(config.url());

    for (name, value) in config.headers() {
        builder = builder.header(name.as_str(), value.as_str());
    }

    if let Some(credential) = config.basic_auth() {
        builder = builder.header("Authorization", basic_auth_header(credential));
    }

    // The body is only transmitted for POST; the payload is derived from the
    // stored body each time, so the config is never left half-encoded.
    let payload = if config.method() == Some(&Method::POST) {
        config.encoded_body()
    } else {
        None
    };

    let result = if let Some(payload) = payload {
        let request = builder
            .body(payload.into_bytes())
            .map_err(|e| e.to_string())?;
        agent.run(request)
    } else {
        let request = builder.body(()).map_err(|e| e.to_string())?;
        agent.run(request)
    };

    result.map_err(|e| e.to_string())
}

fn basic_auth_header(credential: &str) -> String {
    format!("Basic {}", general_purpose::STANDARD.encode(credential))
}

/// Reconstruct the raw header block (status line plus `name: value` lines,
/// `\r\n`-separated, blank-line terminated) from the response parts.
fn raw_header_block(parts: &http::response::Parts) -> String {
    let status = parts.status;
    let mut out = match status.canonical_reason() {
        Some(reason) => format!("{:?} {} {reason}\r\n", parts.version, status.as_u16()),
        None => format!("{:?} {}\r\n", parts.version, status.as_u16()),
    };
    for (name, value) in &parts.headers {
        out.push_str(name.as_str());
        out.push_str(": ");
        out.push_str(&String::from_utf8_lossy(value.as_bytes()));
        out.push_str("\r\n");
    }
    out.push_str("\r\n");
    out
}

fn load_cookie_jar(agent: &ureq::Agent, path: &Path) {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not open cookie jar");
            return;
        }
    };
    let mut jar = agent.cookie_jar_lock();
    if let Err(e) = jar.load_json(BufReader::new(file)) {
        warn!(path = %path.display(), error = %e, "could not load cookie jar");
    }
}

fn save_cookie_jar(agent: &ureq::Agent, path: &Path) {
    let file = match File::create(path) {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not create cookie jar");
            return;
        }
    };
    let mut jar = agent.cookie_jar_lock();
    if let Err(e) = jar.save_json(&mut BufWriter::new(file)) {
        warn!(path = %path.display(), error = %e, "could not save cookie jar");
    }
}
