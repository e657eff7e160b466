//! Request configuration: an immutable snapshot built once by the caller.
//!
//! # Design
//! `RequestConfig` is assembled through `RequestConfigBuilder` and frozen by
//! `build()`. All reconciliation and validation happens at build time, so an
//! executed request always reflects exactly what the caller constructed —
//! there is no ambient mutability and no state to drift between runs.
//!
//! Two pieces of policy live here:
//! - Header / content-type reconciliation: the content type may be supplied
//!   either through `content_type()` or as a `Content-Type` header, and both
//!   views stay consistent after `build()` (content type wins when both are
//!   given).
//! - Body encoding: `encoded_body()` derives the wire payload from the stored
//!   body and content type without ever mutating the stored body, so running
//!   the same configuration twice cannot double-encode.

use std::path::{Path, PathBuf};
use std::time::Duration;

use http::{HeaderName, HeaderValue, Method, Uri};
use serde_json::Value;

use crate::error::ConfigError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable configuration for a single HTTP request.
///
/// Built via [`RequestConfig::builder`]; executed via [`crate::executor::run`].
/// One config may be executed any number of times — each run re-derives the
/// wire payload from the stored fields.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    url: String,
    method: Option<Method>,
    content_type: Option<String>,
    body: Option<Value>,
    headers: Vec<(String, String)>,
    timeout: Duration,
    connect_timeout: Duration,
    basic_auth: Option<String>,
    cookie_jar_path: Option<PathBuf>,
    tls_verify: bool,
    user_agent: Option<String>,
}

impl RequestConfig {
    /// Start building a request for `url`.
    pub fn builder(url: impl Into<String>) -> RequestConfigBuilder {
        RequestConfigBuilder {
            url: url.into(),
            method: None,
            content_type: None,
            body: None,
            headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            basic_auth: None,
            cookie_jar_path: None,
            tls_verify: true,
            user_agent: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The HTTP method, or `None` when the transport default (GET) applies.
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// The reconciled header list, in caller insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Basic-auth credential formatted as `"username:password"`.
    pub fn basic_auth(&self) -> Option<&str> {
        self.basic_auth.as_deref()
    }

    pub fn cookies_enabled(&self) -> bool {
        self.cookie_jar_path.is_some()
    }

    pub fn cookie_jar_path(&self) -> Option<&Path> {
        self.cookie_jar_path.as_deref()
    }

    pub fn tls_verify(&self) -> bool {
        self.tls_verify
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Derive the wire-ready payload from the stored body and content type.
    ///
    /// Encoding rules by content type:
    /// - `application/json`: the body rendered as compact JSON text.
    /// - `application/x-www-form-urlencoded`: an object body rendered as
    ///   `k=v&…` with percent-encoded keys and values; non-object bodies
    ///   fall back to pass-through.
    /// - `text/plain`, anything else, or unset: a string body passes through
    ///   unchanged; a composite body is rendered as JSON text.
    ///
    /// Returns `None` when no body is set. The stored body is never mutated,
    /// so repeated calls always produce the same payload.
    pub fn encoded_body(&self) -> Option<String> {
        let body = self.body.as_ref()?;
        Some(match self.content_type.as_deref() {
            Some("application/json") => body.to_string(),
            Some("application/x-www-form-urlencoded") => match body {
                Value::Object(map) => form_encode(map),
                other => passthrough(other),
            },
            _ => passthrough(body),
        })
    }
}

fn passthrough(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn form_encode(map: &serde_json::Map<String, Value>) -> String {
    map.iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(&value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Builder for [`RequestConfig`].
#[derive(Debug, Clone)]
pub struct RequestConfigBuilder {
    url: String,
    method: Option<Method>,
    content_type: Option<String>,
    body: Option<Value>,
    headers: Vec<(String, String)>,
    timeout: Duration,
    connect_timeout: Duration,
    basic_auth: Option<String>,
    cookie_jar_path: Option<PathBuf>,
    tls_verify: bool,
    user_agent: Option<String>,
}

impl RequestConfigBuilder {
    /// Set the HTTP method. Unset means the transport default, GET.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the content type, which also selects the body encoding policy.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the request body. Only sent when the method is POST.
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Append one header. Call order determines wire order.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append a batch of headers in iteration order.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.push((name.into(), value.into()));
        }
        self
    }

    /// Total request timeout. Default 15 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// TCP connect timeout. Default 10 seconds.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Use HTTP Basic authentication with the given credentials.
    pub fn basic_auth(mut self, username: &str, password: &str) -> Self {
        self.basic_auth = Some(format!("{username}:{password}"));
        self
    }

    /// Enable cookies, persisted to (and re-read from) the given jar file.
    pub fn cookie_jar(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_jar_path = Some(path.into());
        self
    }

    /// Skip TLS certificate verification. Verification is on by default;
    /// turning it off is an explicit, deliberate opt-out.
    pub fn disable_tls_verification(mut self) -> Self {
        self.tls_verify = false;
        self
    }

    /// Send a custom `User-Agent`. An empty string counts as unset.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Reconcile headers with the content type, validate, and freeze.
    ///
    /// Reconciliation: when a content type is set it overwrites any
    /// `Content-Type` header (first occurrence kept in place, duplicates
    /// dropped, appended when absent); otherwise a `Content-Type` header is
    /// adopted as the content type.
    pub fn build(mut self) -> Result<RequestConfig, ConfigError> {
        self.reconcile_content_type();
        self.validate()?;

        let user_agent = self.user_agent.filter(|ua| !ua.is_empty());

        Ok(RequestConfig {
            url: self.url,
            method: self.method,
            content_type: self.content_type,
            body: self.body,
            headers: self.headers,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            basic_auth: self.basic_auth,
            cookie_jar_path: self.cookie_jar_path,
            tls_verify: self.tls_verify,
            user_agent,
        })
    }

    fn reconcile_content_type(&mut self) {
        let is_content_type = |name: &str| name.eq_ignore_ascii_case("content-type");

        match self.content_type.as_deref() {
            Some(content_type) if !content_type.is_empty() => {
                let content_type = content_type.to_string();
                let mut seen = false;
                self.headers.retain_mut(|(name, value)| {
                    if !is_content_type(name) {
                        return true;
                    }
                    if seen {
                        return false;
                    }
                    seen = true;
                    value.clone_from(&content_type);
                    true
                });
                if !seen {
                    self.headers
                        .push(("Content-Type".to_string(), content_type));
                }
            }
            _ => {
                if let Some((_, value)) = self
                    .headers
                    .iter()
                    .find(|(name, _)| is_content_type(name))
                {
                    self.content_type = Some(value.clone());
                }
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let uri: Uri = self
            .url
            .parse()
            .map_err(|_| ConfigError::InvalidUrl(self.url.clone()))?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(ConfigError::InvalidUrl(self.url.clone()));
        }

        for (name, value) in &self.headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ConfigError::InvalidHeaderName(name.clone()))?;
            HeaderValue::from_str(value)
                .map_err(|_| ConfigError::InvalidHeaderValue(name.clone()))?;
        }

        if let Some(path) = &self.cookie_jar_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::MissingCookieJarPath);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn builder() -> RequestConfigBuilder {
        RequestConfig::builder("http://localhost:3000/check")
    }

    #[test]
    fn content_type_wins_over_header() {
        let config = builder()
            .content_type("application/json")
            .header("Content-Type", "text/html")
            .build()
            .unwrap();

        assert_eq!(config.content_type(), Some("application/json"));
        assert_eq!(
            config.headers(),
            [("Content-Type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn content_type_header_is_adopted() {
        let config = builder()
            .header("Content-Type", "application/json")
            .build()
            .unwrap();

        assert_eq!(config.content_type(), Some("application/json"));
    }

    #[test]
    fn content_type_appended_when_no_header_present() {
        let config = builder()
            .content_type("text/plain")
            .header("Accept", "*/*")
            .build()
            .unwrap();

        assert_eq!(
            config.headers(),
            [
                ("Accept".to_string(), "*/*".to_string()),
                ("Content-Type".to_string(), "text/plain".to_string()),
            ]
        );
    }

    #[test]
    fn duplicate_content_type_headers_collapse() {
        let config = builder()
            .content_type("application/json")
            .header("Accept", "*/*")
            .header("content-type", "text/html")
            .header("Content-Type", "text/csv")
            .build()
            .unwrap();

        let content_types: Vec<_> = config
            .headers()
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(
            content_types,
            [&("content-type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn header_order_is_preserved() {
        let config = builder()
            .header("X-First", "1")
            .header("X-Second", "2")
            .header("X-Third", "3")
            .build()
            .unwrap();

        let names: Vec<_> = config.headers().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["X-First", "X-Second", "X-Third"]);
    }

    #[test]
    fn json_body_is_serialized() {
        let config = builder()
            .content_type("application/json")
            .body(json!({"a": 1}))
            .build()
            .unwrap();

        assert_eq!(config.encoded_body().unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn form_body_is_percent_encoded() {
        let config = builder()
            .content_type("application/x-www-form-urlencoded")
            .body(json!({"a": "b c"}))
            .build()
            .unwrap();

        assert_eq!(config.encoded_body().unwrap(), "a=b%20c");
    }

    #[test]
    fn form_body_renders_non_string_scalars() {
        let config = builder()
            .content_type("application/x-www-form-urlencoded")
            .body(json!({"n": 7, "flag": true}))
            .build()
            .unwrap();

        assert_eq!(config.encoded_body().unwrap(), "flag=true&n=7");
    }

    #[test]
    fn plain_text_string_passes_through() {
        let config = builder()
            .content_type("text/plain")
            .body("hello world")
            .build()
            .unwrap();

        assert_eq!(config.encoded_body().unwrap(), "hello world");
    }

    #[test]
    fn plain_text_composite_becomes_json() {
        let config = builder()
            .content_type("text/plain")
            .body(json!({"a": 1}))
            .build()
            .unwrap();

        assert_eq!(config.encoded_body().unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn unknown_content_type_passes_strings_through() {
        let config = builder()
            .content_type("application/octet-stream")
            .body("raw payload")
            .build()
            .unwrap();

        assert_eq!(config.encoded_body().unwrap(), "raw payload");
    }

    #[test]
    fn no_body_encodes_to_none() {
        let config = builder().build().unwrap();
        assert!(config.encoded_body().is_none());
    }

    #[test]
    fn encoding_is_stable_across_calls() {
        let config = builder()
            .content_type("application/json")
            .body(json!({"a": "b"}))
            .build()
            .unwrap();

        assert_eq!(config.encoded_body(), config.encoded_body());
        assert_eq!(config.body(), Some(&json!({"a": "b"})));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = RequestConfig::builder("not a url").build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));

        let err = RequestConfig::builder("/relative/only").build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let err = builder().header("bad header", "v").build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHeaderName(_)));
    }

    #[test]
    fn invalid_header_value_is_rejected() {
        let err = builder().header("X-Ok", "line\nbreak").build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHeaderValue(_)));
    }

    #[test]
    fn empty_cookie_jar_path_is_rejected() {
        let err = builder().cookie_jar("").build().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCookieJarPath));
    }

    #[test]
    fn empty_user_agent_counts_as_unset() {
        let config = builder().user_agent("").build().unwrap();
        assert_eq!(config.user_agent(), None);
    }

    #[test]
    fn defaults() {
        let config = builder().build().unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert!(config.tls_verify());
        assert!(!config.cookies_enabled());
        assert_eq!(config.method(), None);
    }
}
