//! Retry and backoff policy for HTTP requests.
//!
//! Error classification (timeouts, throttling, connection failures) and
//! exponential backoff decisions, shared by page, embed and asset fetches.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
