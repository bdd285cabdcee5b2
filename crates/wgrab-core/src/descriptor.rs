//! Bundle descriptor: `game_info.json`, written last.
//!
//! Records where the bundle came from, when it was retrieved, which roles
//! were materialized and a SHA-256 of every canonical file. Checksums are
//! computed after canonicalization, not inline with the downloads.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::canonical::{CanonicalAliases, Role};

/// Original embed markup, unmodified.
pub const ORIGINAL_FILE: &str = "index.html";
/// Rewritten host-independent page.
pub const STANDALONE_FILE: &str = "standalone.html";
/// Full-viewport frame around the standalone page.
pub const LAUNCHER_FILE: &str = "launcher.html";
pub const DESCRIPTOR_FILE: &str = "game_info.json";

/// Bundle kind recorded in every descriptor.
pub const BUNDLE_KIND: &str = "unity_webgl";

const BUF_SIZE: usize = 64 * 1024;

/// Page files of a bundle, relative to the bundle directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleFiles {
    pub original: String,
    pub standalone: String,
    pub launcher: String,
}

impl Default for BundleFiles {
    fn default() -> Self {
        Self {
            original: ORIGINAL_FILE.to_string(),
            standalone: STANDALONE_FILE.to_string(),
            launcher: LAUNCHER_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleDescriptor {
    pub name: String,
    pub source_url: String,
    pub embed_url: String,
    /// RFC 3339 UTC timestamp.
    pub retrieved_at: String,
    /// Materialized roles, sorted.
    pub roles: Vec<Role>,
    pub files: BundleFiles,
    /// Canonical file (relative to the bundle directory, `/`-separated) -> SHA-256 hex.
    pub checksums: BTreeMap<String, String>,
    pub kind: String,
}

impl BundleDescriptor {
    /// Builds the descriptor for a canonicalized bundle, hashing every canonical file.
    pub fn collect(
        bundle_dir: &Path,
        name: &str,
        source_url: &str,
        embed_url: &str,
        aliases: &CanonicalAliases,
    ) -> Result<Self> {
        let mut checksums = BTreeMap::new();
        for (_, entry) in aliases.iter() {
            let digest = sha256_path(&bundle_dir.join(&entry.canonical))?;
            checksums.insert(portable_path(&entry.canonical), digest);
        }
        Ok(Self {
            name: name.to_string(),
            source_url: source_url.to_string(),
            embed_url: embed_url.to_string(),
            retrieved_at: chrono::Utc::now().to_rfc3339(),
            roles: aliases.roles().into_iter().collect(),
            files: BundleFiles::default(),
            checksums,
            kind: BUNDLE_KIND.to_string(),
        })
    }
}

fn portable_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks; build data files can be hundreds of megabytes.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Writes `descriptor` as pretty JSON to `<bundle_dir>/game_info.json`.
pub fn write_descriptor(bundle_dir: &Path, descriptor: &BundleDescriptor) -> Result<PathBuf> {
    let path = bundle_dir.join(DESCRIPTOR_FILE);
    let json = serde_json::to_string_pretty(descriptor).context("serialize bundle descriptor")?;
    fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    tracing::debug!("wrote {}", path.display());
    Ok(path)
}

/// Reads a descriptor back (e.g. to list or re-check a bundle).
pub fn read_descriptor(bundle_dir: &Path) -> Result<BundleDescriptor> {
    let path = bundle_dir.join(DESCRIPTOR_FILE);
    let data = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parse {}", path.display()))
}
