//! Mapping URL paths to local filesystem paths.

use std::path::{Component, Path, PathBuf};

/// Extracts the last non-empty path segment of a URL.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn last_path_segment(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Local path of an asset under the bundle directory.
///
/// The relative path from the markup is used verbatim (percent escapes
/// included; the canonicalizer decodes them later) minus any query or fragment.
/// Returns `None` for absolute paths or paths that would escape the bundle.
pub fn asset_local_path(relative_path: &str) -> Option<PathBuf> {
    let trimmed = relative_path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    if trimmed.is_empty() || trimmed.starts_with('/') || trimmed.contains('\\') {
        return None;
    }
    let mut out = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(c) => out.push(c),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if out.file_name().is_none() {
        return None;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_segment_normal() {
        assert_eq!(
            last_path_segment("https://dev.itch.io/cool-game").as_deref(),
            Some("cool-game")
        );
        assert_eq!(
            last_path_segment("https://example.com/a/b/?x=1").as_deref(),
            Some("b")
        );
    }

    #[test]
    fn last_segment_root_or_empty() {
        assert_eq!(last_path_segment("https://example.com/"), None);
        assert_eq!(last_path_segment("https://example.com"), None);
    }

    #[test]
    fn asset_path_mirrors_relative_layout() {
        assert_eq!(
            asset_local_path("Build/MyGame.data.gz"),
            Some(PathBuf::from("Build/MyGame.data.gz"))
        );
        assert_eq!(
            asset_local_path("./Build/My%20Game.wasm?v=2"),
            Some(PathBuf::from("Build/My%20Game.wasm"))
        );
    }

    #[test]
    fn asset_path_rejects_escapes() {
        assert_eq!(asset_local_path("../secret"), None);
        assert_eq!(asset_local_path("Build/../../x"), None);
        assert_eq!(asset_local_path("/etc/passwd"), None);
        assert_eq!(asset_local_path("?only=query"), None);
        assert_eq!(asset_local_path("Build\\x.wasm"), None);
    }
}
