//! Asset Manifest Extractor.
//!
//! Two independent scans over the embed markup, composed by union and
//! de-duplication on the on-disk location of each asset:
//!
//! - [`structural::scan_script_sources`]: `script[src]` elements pointing into
//!   the build directory (the loader is always found this way);
//! - [`config_scan::scan_inline_config`]: `frameworkUrl` / `dataUrl` /
//!   `codeUrl` values inside inline loader configuration objects.

mod config_scan;
mod structural;

pub use config_scan::scan_inline_config;
pub use structural::scan_script_sources;

use crate::error::PipelineError;
use crate::url_model::{asset_local_path, embed_base, resolve_url};

/// Conventional directory holding every build asset.
pub const ASSET_ROOT_PREFIX: &str = "Build/";

/// One asset to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// Path relative to the embed base URL, verbatim from the markup.
    pub relative_path: String,
    /// Absolute, request-safe URL.
    pub absolute_url: String,
}

/// Ordered, de-duplicated asset list. Insertion order is discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    references: Vec<AssetReference>,
}

impl AssetManifest {
    /// Appends `reference` unless an asset landing on the same local path is
    /// already present (first discovery wins). `Build/G.wasm?v=2` and
    /// `./Build/G.wasm` are the same asset. Returns true if it was added.
    pub fn insert(&mut self, reference: AssetReference) -> bool {
        let key = dedup_key(&reference.relative_path);
        if self
            .references
            .iter()
            .any(|r| dedup_key(&r.relative_path) == key)
        {
            return false;
        }
        self.references.push(reference);
        true
    }

    pub fn references(&self) -> &[AssetReference] {
        &self.references
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn into_references(self) -> Vec<AssetReference> {
        self.references
    }
}

/// Paths that cannot be mapped to disk keep their verbatim text as the key;
/// the fetcher rejects them individually.
fn dedup_key(relative_path: &str) -> String {
    match asset_local_path(relative_path) {
        Some(local) => local.to_string_lossy().into_owned(),
        None => relative_path.to_string(),
    }
}

impl<'a> IntoIterator for &'a AssetManifest {
    type Item = &'a AssetReference;
    type IntoIter = std::slice::Iter<'a, AssetReference>;

    fn into_iter(self) -> Self::IntoIter {
        self.references.iter()
    }
}

/// Role suffixes a build asset file name ends with, before an optional `.gz`.
const ROLE_SUFFIXES: [&str; 4] = [".loader.js", ".framework.js", ".data", ".wasm"];

/// True if `path` names a build asset: under the asset root, or ending in a
/// role suffix (`.loader.js`, `.framework.js`, `.data`, `.wasm`, each with an
/// optional `.gz`). Query and fragment are ignored.
pub(crate) fn is_build_asset_path(path: &str) -> bool {
    path.starts_with(ASSET_ROOT_PREFIX) || has_role_suffix(path)
}

fn has_role_suffix(path: &str) -> bool {
    let lower = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let bare = lower.strip_suffix(".gz").unwrap_or(&lower);
    ROLE_SUFFIXES.iter().any(|suffix| bare.ends_with(suffix))
}

/// True if `path` is relative to the embed base (not absolute, root- or protocol-relative).
pub(crate) fn is_base_relative(path: &str) -> bool {
    !(path.is_empty()
        || path.starts_with('/')
        || path.starts_with('#')
        || path.contains("://")
        || path.starts_with("data:")
        || path.starts_with("blob:"))
}

/// Builds the manifest for an embed page. Both scans always run.
///
/// Fails with `ManifestEmpty` when neither scan finds an asset.
pub fn extract_manifest(embed_url: &str, markup: &str) -> Result<AssetManifest, PipelineError> {
    let base = embed_base(embed_url).unwrap_or_else(|| embed_url.to_string());

    let from_scripts = scan_script_sources(markup);
    let from_config = scan_inline_config(markup);
    tracing::debug!(
        scripts = from_scripts.len(),
        config = from_config.len(),
        "asset scans finished"
    );

    let mut manifest = AssetManifest::default();
    for relative_path in from_scripts.into_iter().chain(from_config) {
        let Some(absolute_url) = resolve_url(&base, &relative_path) else {
            tracing::warn!(path = %relative_path, "cannot build asset URL; skipping");
            continue;
        };
        if manifest.insert(AssetReference {
            relative_path: relative_path.clone(),
            absolute_url,
        }) {
            tracing::debug!(path = %relative_path, "asset discovered");
        }
    }

    if manifest.is_empty() {
        return Err(PipelineError::ManifestEmpty {
            url: embed_url.to_string(),
        });
    }
    tracing::info!("found {} assets to download", manifest.len());
    Ok(manifest)
}
