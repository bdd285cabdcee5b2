//! Structural search for the embed frame in host page markup.

use scraper::{Html, Selector};

/// Which search strategy produced the embed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedStrategy {
    /// `iframe` whose `src` contains a known embed-host fragment.
    HostFragment,
    /// Game frame (`#game_drop`, or a `.game_frame` frame or container).
    GenericFrame,
    /// `iframe` markup stored in a placeholder's `data-iframe` attribute.
    Placeholder,
    /// First `iframe[src]` anywhere on the page.
    AnyFrame,
}

const GENERIC_FRAME_SELECTORS: &[&str] = &[
    "iframe#game_drop",
    "iframe.game_frame",
    ".game_frame iframe[src]",
];
const ANY_FRAME_SELECTOR: &str = "iframe[src]";
const PLACEHOLDER_SELECTOR: &str = ".iframe_placeholder[data-iframe]";

fn first_src(doc: &Html, selector: &str) -> Option<String> {
    let selector = match Selector::parse(selector) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(selector, "invalid embed selector: {:?}", e);
            return None;
        }
    };
    doc.select(&selector)
        .filter_map(|el| el.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty())
        .map(str::to_string)
}

/// Finds the raw (unresolved) embed frame source in `markup`.
///
/// Strategies run in priority order: host fragments (most specific first),
/// game frames, the placeholder attribute (whose value is re-parsed as
/// markup), and finally any frame with a `src`.
pub fn locate_embed(markup: &str, fragments: &[String]) -> Option<(String, EmbedStrategy)> {
    let doc = Html::parse_document(markup);

    for fragment in fragments {
        let selector = format!(r#"iframe[src*="{}"]"#, fragment.replace(['"', '\\'], ""));
        if let Some(src) = first_src(&doc, &selector) {
            return Some((src, EmbedStrategy::HostFragment));
        }
    }

    for selector in GENERIC_FRAME_SELECTORS {
        if let Some(src) = first_src(&doc, selector) {
            return Some((src, EmbedStrategy::GenericFrame));
        }
    }

    if let Ok(placeholder) = Selector::parse(PLACEHOLDER_SELECTOR) {
        let found = doc
            .select(&placeholder)
            .filter_map(|el| el.value().attr("data-iframe"))
            .find_map(|inner| {
                let fragment = Html::parse_fragment(inner);
                first_src(&fragment, ANY_FRAME_SELECTOR)
            });
        if let Some(src) = found {
            return Some((src, EmbedStrategy::Placeholder));
        }
    }

    first_src(&doc, ANY_FRAME_SELECTOR).map(|src| (src, EmbedStrategy::AnyFrame))
}
