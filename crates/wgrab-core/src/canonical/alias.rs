//! Alias pass: copy each classified build file to its canonical name.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use super::{classify, CanonicalName, Role};
use crate::error::{PipelineError, Stage};

/// One materialized canonical file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    /// Decoded source file, relative to the bundle directory.
    pub source: PathBuf,
    /// Canonical copy, relative to the bundle directory.
    pub canonical: PathBuf,
    /// False when the canonical file was already present (re-run).
    pub created: bool,
}

/// Canonical slots materialized for a bundle, at most one per (role, compressed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalAliases {
    entries: BTreeMap<CanonicalName, AliasEntry>,
}

impl CanonicalAliases {
    pub fn get(&self, name: &CanonicalName) -> Option<&AliasEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalName, &AliasEntry)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Roles with at least one materialized slot.
    pub fn roles(&self) -> BTreeSet<Role> {
        self.entries.keys().map(|k| k.role).collect()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.entries.keys().any(|k| k.role == role)
    }

    /// Roles whose absence makes the bundle unbootable: the loader, and
    /// framework/code when neither of them is present.
    pub fn missing_required(&self) -> Vec<Role> {
        let mut missing = Vec::new();
        if !self.has_role(Role::Loader) {
            missing.push(Role::Loader);
        }
        if !self.has_role(Role::Framework) && !self.has_role(Role::Code) {
            missing.push(Role::Framework);
            missing.push(Role::Code);
        }
        missing
    }
}

/// Copies each classified file in `files` (relative to `bundle_dir`, in fetch
/// order) to its canonical name in the same directory.
///
/// The first file to claim a slot wins; later files for the same slot are
/// skipped. An existing canonical file is never overwritten, which keeps
/// re-runs non-destructive.
pub fn alias_files(bundle_dir: &Path, files: &[PathBuf]) -> Result<CanonicalAliases, PipelineError> {
    let mut aliases = CanonicalAliases::default();
    for rel in files {
        let Some(file_name) = rel.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if CanonicalName::is_canonical_file_name(file_name) {
            continue;
        }
        let Some(slot) = classify(file_name) else {
            tracing::debug!(file = %rel.display(), "not a build file; no alias");
            continue;
        };
        if let Some(winner) = aliases.get(&slot) {
            tracing::debug!(
                file = %rel.display(),
                winner = %winner.source.display(),
                "canonical slot {} already taken",
                slot.file_name()
            );
            continue;
        }

        let canonical = rel.with_file_name(slot.file_name());
        let target = bundle_dir.join(&canonical);
        let created = if target.exists() {
            false
        } else {
            let source = bundle_dir.join(rel);
            fs::copy(&source, &target).map_err(|e| PipelineError::write(Stage::Canonicalize, &target, e))?;
            tracing::info!("created canonical copy: {} -> {}", rel.display(), canonical.display());
            true
        };
        aliases.entries.insert(
            slot,
            AliasEntry {
                source: rel.clone(),
                canonical,
                created,
            },
        );
    }
    Ok(aliases)
}
