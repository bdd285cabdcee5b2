//! Structural scan: build assets loaded through `script[src]` elements.

use scraper::{Html, Selector};

use super::{is_base_relative, is_build_asset_path};

/// Returns the `src` of every script element that points at a build asset,
/// verbatim and in document order. Duplicates are left to the manifest.
pub fn scan_script_sources(markup: &str) -> Vec<String> {
    let doc = Html::parse_document(markup);
    let Ok(selector) = Selector::parse("script[src]") else {
        return Vec::new();
    };
    doc.select(&selector)
        .filter_map(|el| el.value().attr("src"))
        .map(str::trim)
        .filter(|src| is_base_relative(src) && is_build_asset_path(src))
        .map(str::to_string)
        .collect()
}
