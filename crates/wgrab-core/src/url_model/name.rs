//! Default bundle name for a host page URL.

use std::sync::OnceLock;

use regex::Regex;

use super::path::last_path_segment;
use super::sanitize::sanitize_dir_name;

/// Name used when nothing usable can be derived from the URL.
const DEFAULT_BUNDLE_NAME: &str = "game";

fn itch_slug() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.itch\.io/([^/?#]+)").expect("valid itch slug regex"))
}

/// Derives a directory-safe bundle name from a host page URL.
///
/// `https://dev.itch.io/die-in-the-dungeon` → `die-in-the-dungeon`; other
/// hosts use the last path segment.
pub fn bundle_name_from_url(url: &str) -> String {
    let candidate = itch_slug()
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .or_else(|| last_path_segment(url));

    match candidate.map(|c| sanitize_dir_name(&c)) {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_BUNDLE_NAME.to_string(),
    }
}
