//! URL joining, asset path mapping and bundle naming.

mod name;
mod path;
mod sanitize;

pub use name::bundle_name_from_url;
pub use path::{asset_local_path, last_path_segment};
pub use sanitize::sanitize_dir_name;

use url::Url;

/// Resolves `reference` (relative, root-relative or protocol-relative) against `base`.
/// The returned URL is serialized by the `url` crate, which percent-encodes
/// characters that are unsafe in a bare request (spaces, quotes, non-ASCII)
/// while leaving existing `%XX` escapes intact.
pub fn resolve_url(base: &str, reference: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    let joined = base.join(reference.trim()).ok()?;
    match joined.scheme() {
        "http" | "https" => Some(joined.into()),
        _ => None,
    }
}

/// Directory URL of the embed page: query, fragment and final path segment removed.
///
/// `https://cdn.example/game/index.html?v=3` → `https://cdn.example/game/`
pub fn embed_base(embed_url: &str) -> Option<String> {
    let url = Url::parse(embed_url).ok()?;
    url.join("./").ok().map(Into::into)
}
