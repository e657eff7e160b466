//! Configurable blocking HTTP request client.
//!
//! # Overview
//! A thin convenience layer over the `ureq` transport: describe one request
//! as a [`RequestConfig`], execute it synchronously with [`executor::run`],
//! and read the outcome from the returned [`ResponseResult`].
//!
//! # Design
//! - `RequestConfig` is immutable after `build()`; content-type/header
//!   reconciliation and validation happen at build time.
//! - `executor::run` performs exactly one request/response cycle — no
//!   retries, no pooling, no shared state between calls. Transport failures
//!   are reported on the result, never raised.
//! - `ResponseResult` is a write-once snapshot with derived views (header
//!   map, elapsed-time conversion, body substring check).
//! - Connection handling, TLS, redirects, and the cookie jar file format
//!   belong to the transport; instances are independent, so concurrent
//!   callers simply run one config per thread.

pub mod config;
pub mod error;
pub mod executor;
pub mod response;

pub use config::{RequestConfig, RequestConfigBuilder};
pub use error::ConfigError;
pub use response::{ResponseResult, TimeUnit};
