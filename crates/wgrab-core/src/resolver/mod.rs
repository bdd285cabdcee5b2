//! URL Resolver: find the embedded game frame on a host page and fetch it.
//!
//! The host page (e.g. `https://dev.itch.io/game`) only displays the game;
//! the runtime markup lives at the embed URL of an `iframe`, sometimes
//! deferred into a placeholder attribute until the user clicks "Run game".

mod locate;

pub use locate::{locate_embed, EmbedStrategy};

use crate::error::{PipelineError, Stage};
use crate::http::{fetch_text, Transport};
use crate::retry::RetryPolicy;
use crate::url_model::resolve_url;

/// Resolved embed URL plus the markup served there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedReference {
    pub url: String,
    pub markup: String,
}

/// Resolves an absolute embed URL from host page markup.
///
/// Relative and protocol-relative frame sources are resolved against `host_url`.
pub fn embed_url_from_markup(
    host_url: &str,
    markup: &str,
    fragments: &[String],
) -> Result<String, PipelineError> {
    let not_found = || PipelineError::EmbedNotFound {
        url: host_url.to_string(),
    };
    let (src, strategy) = locate_embed(markup, fragments).ok_or_else(not_found)?;
    let url = resolve_url(host_url, &src).ok_or_else(|| {
        tracing::warn!(src = %src, "embedded frame source is not an http(s) URL");
        not_found()
    })?;
    tracing::info!(?strategy, "found embedded game URL: {}", url);
    Ok(url)
}

/// Fetches the host page, locates the embed URL and fetches the embed markup.
pub fn resolve_embed(
    transport: &dyn Transport,
    policy: &RetryPolicy,
    host_url: &str,
    fragments: &[String],
) -> Result<EmbedReference, PipelineError> {
    tracing::info!("fetching game page: {}", host_url);
    let host_markup = fetch_text(transport, policy, host_url).map_err(|source| {
        PipelineError::Transport {
            stage: Stage::Resolve,
            url: host_url.to_string(),
            source,
        }
    })?;

    let url = embed_url_from_markup(host_url, &host_markup, fragments)?;

    tracing::info!("fetching embedded game page: {}", url);
    let markup = fetch_text(transport, policy, &url).map_err(|source| PipelineError::Transport {
        stage: Stage::Resolve,
        url: url.clone(),
        source,
    })?;
    Ok(EmbedReference { url, markup })
}
