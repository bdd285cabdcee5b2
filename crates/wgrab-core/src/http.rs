//! HTTP GET over libcurl behind a small `Transport` trait.
//!
//! Pipeline stages only see the trait, so they can be exercised against an
//! in-memory transport in tests. All calls block the current thread; run the
//! pipeline from `spawn_blocking` when driving it from async code.

use std::io::Write;
use std::time::Duration;

use crate::config::WgrabConfig;
use crate::retry::{run_with_retry, FetchError, RetryPolicy};

/// What a request is for; selects the timeout budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Host page or embed page markup.
    Page,
    /// Build asset (possibly tens of megabytes).
    Asset,
}

/// Minimal GET interface used by the pipeline.
pub trait Transport: Send + Sync {
    /// Streams the response body of `url` into `sink`. Returns the number of bytes written.
    /// Non-2xx responses are errors (`FetchError::Http`).
    fn fetch_into(
        &self,
        url: &str,
        kind: RequestKind,
        sink: &mut dyn Write,
    ) -> Result<u64, FetchError>;

    /// Fetches the full response body into memory.
    fn fetch(&self, url: &str, kind: RequestKind) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();
        self.fetch_into(url, kind, &mut body)?;
        Ok(body)
    }
}

/// Fetches a page as text, retrying transient failures per `policy`.
/// Invalid UTF-8 is replaced rather than rejected; markup is scanned textually.
pub fn fetch_text(
    transport: &dyn Transport,
    policy: &RetryPolicy,
    url: &str,
) -> Result<String, FetchError> {
    let body = run_with_retry(policy, url, || transport.fetch(url, RequestKind::Page))?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// libcurl-backed transport.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    pub connect_timeout: Duration,
    pub page_timeout: Duration,
    pub asset_timeout: Duration,
    pub user_agent: String,
}

impl CurlTransport {
    pub fn from_config(cfg: &WgrabConfig) -> Self {
        Self {
            connect_timeout: cfg.connect_timeout(),
            page_timeout: cfg.page_timeout(),
            asset_timeout: cfg.asset_timeout(),
            user_agent: cfg.user_agent.clone(),
        }
    }
}

impl Transport for CurlTransport {
    fn fetch_into(
        &self,
        url: &str,
        kind: RequestKind,
        sink: &mut dyn Write,
    ) -> Result<u64, FetchError> {
        match url::Url::parse(url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            Ok(u) => {
                let msg = format!("unsupported scheme {}: {}", u.scheme(), url);
                return Err(FetchError::InvalidUrl(msg));
            }
            Err(e) => return Err(FetchError::InvalidUrl(format!("{}: {}", url, e))),
        }
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&self.user_agent)?;
        easy.connect_timeout(self.connect_timeout)?;
        match kind {
            RequestKind::Page => easy.timeout(self.page_timeout)?,
            RequestKind::Asset => {
                // Abort stalled transfers early instead of waiting out the full budget.
                easy.low_speed_limit(1024)?;
                easy.low_speed_time(Duration::from_secs(60))?;
                easy.timeout(self.asset_timeout)?;
            }
        }

        let mut written = 0u64;
        let mut storage_error: Option<std::io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match sink.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    storage_error = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };
        if let Err(e) = performed {
            if e.is_write_error() {
                if let Some(io_err) = storage_error.take() {
                    return Err(FetchError::Storage(io_err));
                }
            }
            return Err(FetchError::Curl(e));
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        tracing::debug!(url, bytes = written, "GET complete");
        Ok(written)
    }
}
