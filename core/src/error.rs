//! Error types for request configuration.
//!
//! # Design
//! Only configuration problems are surfaced as Rust errors, and only at
//! `RequestConfigBuilder::build` time. Transport failures (DNS, connect,
//! timeout, TLS) are never raised — they land as an advisory string on the
//! `ResponseResult` so a failed attempt is inspected after the call rather
//! than caught as an exception.

use std::fmt;

/// Errors returned when a `RequestConfigBuilder` fails validation.
#[derive(Debug)]
pub enum ConfigError {
    /// The target URL could not be parsed as a URI.
    InvalidUrl(String),

    /// A header name is not a valid HTTP header name.
    InvalidHeaderName(String),

    /// A header value contains bytes that are not legal in an HTTP header.
    InvalidHeaderValue(String),

    /// Cookies were enabled without a cookie jar path.
    MissingCookieJarPath,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidUrl(url) => write!(f, "invalid URL: {url}"),
            ConfigError::InvalidHeaderName(name) => {
                write!(f, "invalid header name: {name}")
            }
            ConfigError::InvalidHeaderValue(name) => {
                write!(f, "invalid value for header: {name}")
            }
            ConfigError::MissingCookieJarPath => {
                write!(f, "cookies enabled without a cookie jar path")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
