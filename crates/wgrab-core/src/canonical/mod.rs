//! Filename canonicalization into the fixed role vocabulary.
//!
//! A Unity WebGL build ships four files whose names carry the product name
//! (`MyGame.loader.js`, `MyGame.framework.js.gz`, `MyGame.data.gz`,
//! `MyGame.wasm.gz`). The canonicalizer decodes percent-encoded names and
//! copies each file to a product-independent alias (`loader.js`,
//! `framework.js.gz`, `data.gz`, `wasm.gz`) next to the original.

mod alias;
mod decode;

pub use alias::{alias_files, AliasEntry, CanonicalAliases};
pub use decode::decode_file_names;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Stage};

/// Compression suffix recognised on build files.
pub const COMPRESSED_SUFFIX: &str = ".gz";

/// Canonical asset role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Loader,
    Framework,
    Data,
    Code,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Loader, Role::Framework, Role::Data, Role::Code];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Loader => "loader",
            Role::Framework => "framework",
            Role::Data => "data",
            Role::Code => "code",
        }
    }

    /// Filename marker searched case-insensitively in a build file name.
    pub fn marker(self) -> &'static str {
        match self {
            Role::Loader => ".loader.js",
            Role::Framework => ".framework.js",
            Role::Data => ".data",
            Role::Code => ".wasm",
        }
    }

    /// Canonical filename without compression suffix.
    pub fn base_name(self) -> &'static str {
        match self {
            Role::Loader => "loader.js",
            Role::Framework => "framework.js",
            Role::Data => "data",
            Role::Code => "wasm",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One canonical slot: a role plus compression flag. The loader is never compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalName {
    pub role: Role,
    pub compressed: bool,
}

impl CanonicalName {
    pub fn new(role: Role, compressed: bool) -> Self {
        Self {
            role,
            compressed: compressed && role != Role::Loader,
        }
    }

    pub fn file_name(&self) -> String {
        if self.compressed {
            format!("{}{}", self.role.base_name(), COMPRESSED_SUFFIX)
        } else {
            self.role.base_name().to_string()
        }
    }

    /// True if `file_name` already is one of the canonical aliases.
    pub fn is_canonical_file_name(file_name: &str) -> bool {
        Role::ALL.iter().any(|role| {
            file_name == role.base_name()
                || (*role != Role::Loader
                    && file_name
                        .strip_suffix(COMPRESSED_SUFFIX)
                        .is_some_and(|base| base == role.base_name()))
        })
    }
}

/// Classifies a build file name (or path, query string allowed) into a canonical slot.
///
/// Markers are tried in role order (loader, framework, data, code) so
/// `Game.framework.js` never counts as data. Compression is an independent
/// check for a trailing `.gz`.
pub fn classify(name: &str) -> Option<CanonicalName> {
    let path = name.split(['?', '#']).next().unwrap_or_default();
    let lower = path.to_ascii_lowercase();
    let role = Role::ALL
        .into_iter()
        .find(|role| lower.contains(role.marker()))?;
    Some(CanonicalName::new(role, lower.ends_with(COMPRESSED_SUFFIX)))
}

/// Runs both passes over the given fetched files (paths relative to `bundle_dir`),
/// in fetch order. Returns the alias mapping.
pub fn canonicalize(
    bundle_dir: &Path,
    fetched: &[PathBuf],
) -> Result<CanonicalAliases, PipelineError> {
    let decoded = decode_file_names(bundle_dir, fetched)?;
    alias_files(bundle_dir, &decoded)
}

/// Re-runs canonicalization over every regular file in `asset_dir`
/// (relative to `bundle_dir`), sorted by name. Existing aliases are kept.
pub fn canonicalize_dir(
    bundle_dir: &Path,
    asset_dir: &Path,
) -> Result<CanonicalAliases, PipelineError> {
    let dir = bundle_dir.join(asset_dir);
    let read = std::fs::read_dir(&dir).map_err(|e| PipelineError::write(Stage::Canonicalize, &dir, e))?;
    let mut files = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| PipelineError::write(Stage::Canonicalize, &dir, e))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_file && !CanonicalName::is_canonical_file_name(&name) {
            files.push(asset_dir.join(name));
        }
    }
    files.sort();
    canonicalize(bundle_dir, &files)
}


#[cfg(test)]
mod rerun_tests {
    use super::*;
    use std::fs;

    #[test]
    fn percent_encoded_code_file_is_decoded_then_aliased() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Build")).unwrap();
        fs::write(dir.path().join("Build/My%20Game.wasm"), b"\0asm").unwrap();

        let aliases =
            canonicalize(dir.path(), &[PathBuf::from("Build/My%20Game.wasm")]).unwrap();

        assert!(dir.path().join("Build/My Game.wasm").exists());
        assert!(dir.path().join("Build/wasm").exists());
        assert!(!dir.path().join("Build/wasm.gz").exists());
        let entry = aliases.get(&CanonicalName::new(Role::Code, false)).unwrap();
        assert_eq!(entry.source, PathBuf::from("Build/My Game.wasm"));
    }

    #[test]
    fn rerun_on_canonicalized_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join("Build");
        fs::create_dir_all(&build).unwrap();
        fs::write(build.join("G.loader.js"), b"loader").unwrap();
        fs::write(build.join("G%20X.framework.js.gz"), b"fw").unwrap();
        fs::write(build.join("G.data.gz"), b"data").unwrap();

        let first = canonicalize_dir(dir.path(), Path::new("Build")).unwrap();
        let snapshot = |p: &Path| {
            let mut v: Vec<(String, Vec<u8>)> = fs::read_dir(p)
                .unwrap()
                .map(|e| e.unwrap())
                .map(|e| (e.file_name().to_string_lossy().into_owned(), fs::read(e.path()).unwrap()))
                .collect();
            v.sort();
            v
        };
        let before = snapshot(&build);

        let second = canonicalize_dir(dir.path(), Path::new("Build")).unwrap();

        assert_eq!(snapshot(&build), before);
        assert_eq!(first.roles(), second.roles());
        assert!(second.iter().all(|(_, e)| !e.created));
        assert_eq!(fs::read(build.join("framework.js.gz")).unwrap(), b"fw");
    }
}
