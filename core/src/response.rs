//! Captured outcome of one executed request.
//!
//! # Design
//! `ResponseResult` is a write-once snapshot produced by the executor and
//! read through accessors afterwards. Transport failures are part of the
//! snapshot, not Rust errors: a failed attempt shows up as status 0, empty
//! header block and body, and a non-empty `transport_error()` string.

use std::collections::HashMap;

use tracing::debug;

/// Unit for [`ResponseResult::elapsed`]. Milliseconds is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    #[default]
    Milliseconds,
}

/// The outcome of a single request/response cycle.
#[derive(Debug, Clone)]
pub struct ResponseResult {
    status_code: u16,
    raw_header: String,
    body: String,
    elapsed_seconds: f64,
    transport_error: String,
}

impl ResponseResult {
    pub(crate) fn completed(
        status_code: u16,
        raw_header: String,
        body: String,
        elapsed_seconds: f64,
    ) -> Self {
        Self {
            status_code,
            raw_header,
            body,
            elapsed_seconds,
            transport_error: String::new(),
        }
    }

    pub(crate) fn failed(transport_error: String, elapsed_seconds: f64) -> Self {
        Self {
            status_code: 0,
            raw_header: String::new(),
            body: String::new(),
            elapsed_seconds,
            transport_error,
        }
    }

    /// Numeric HTTP status, or 0 when the transport failed before a response.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// The raw header block including the status line, `\r\n`-separated.
    pub fn raw_header(&self) -> &str {
        &self.raw_header
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Wall-clock time spent in the transport call, in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Transport-level error text. Empty when the call completed.
    pub fn transport_error(&self) -> &str {
        &self.transport_error
    }

    pub fn is_transport_error(&self) -> bool {
        !self.transport_error.is_empty()
    }

    /// Parse the raw header block into a map.
    ///
    /// The status line is stored under `"http_status"` and the numeric
    /// status under `"http_code"`. Remaining lines are split on the first
    /// `": "`; lines without that separator are skipped. Header names are
    /// whatever the transport reported (lowercase for HTTP/1.1 responses
    /// normalized by the `http` crate).
    pub fn header_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("http_code".to_string(), self.status_code.to_string());

        let mut lines = self.raw_header.split("\r\n").filter(|l| !l.is_empty());
        if let Some(status_line) = lines.next() {
            map.insert("http_status".to_string(), status_line.to_string());
        }
        for line in lines {
            match line.split_once(": ") {
                Some((name, value)) => {
                    map.insert(name.to_string(), value.to_string());
                }
                None => debug!(line, "skipping malformed response header line"),
            }
        }
        map
    }

    /// The elapsed time converted to `unit` and rounded to the nearest
    /// integer.
    pub fn elapsed(&self, unit: TimeUnit) -> u64 {
        let value = match unit {
            TimeUnit::Seconds => self.elapsed_seconds,
            TimeUnit::Minutes => self.elapsed_seconds / 60.0,
            TimeUnit::Hours => self.elapsed_seconds / 3600.0,
            TimeUnit::Milliseconds => self.elapsed_seconds * 1000.0,
        };
        value.round() as u64
    }

    /// Whether the body contains `needle` as a literal, case-sensitive
    /// substring. Only true for a 200 response with a non-empty body.
    pub fn contains_in_body(&self, needle: &str) -> bool {
        self.status_code == 200 && !self.body.is_empty() && self.body.contains(needle)
    }
}
