//! Transport error type for retry classification.

/// Error returned by a single HTTP request (curl failure, HTTP error, or sink failure).
/// Kept separate from the pipeline taxonomy so retries can be decided per request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// The URL could not be parsed or joined.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// Writing the response body to its destination failed. Not retried.
    #[error("storage: {0}")]
    Storage(std::io::Error),
}
