//! Utility modules supporting the tools and transports.
//!
//! - [`HttpClient`]: shared HTTP client with sensible defaults
//! - [`RetryConfig`] / [`with_retry`]: retry with exponential backoff for
//!   transient API failures (used by the weather tools; the client dispatcher
//!   deliberately never retries)

mod http;
mod retry;

pub use http::HttpClient;
pub use retry::{api_retry_config, with_retry, RetryConfig};
