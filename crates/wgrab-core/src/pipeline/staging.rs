//! Staging directory for a run and the final move into `<out>/<name>`.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{PipelineError, Stage};

const STAGING_PREFIX: &str = ".wgrab-";
const PREVIOUS_PREFIX: &str = ".wgrab-old-";
#[cfg(unix)]
const BUNDLE_DIR_MODE: u32 = 0o755;

/// Creates the output root if needed and a fresh staging directory inside it.
/// The directory is removed when the returned guard is dropped.
pub(super) fn create(out_root: &Path) -> Result<TempDir, PipelineError> {
    fs::create_dir_all(out_root).map_err(|e| PipelineError::write(Stage::Fetch, out_root, e))?;
    tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(out_root)
        .map_err(|e| PipelineError::write(Stage::Fetch, out_root, e))
}

/// Moves the staging directory to `dest`, replacing any previous bundle there.
///
/// A previous bundle is first moved aside into a sibling holding directory and
/// only deleted once the new one is in place; if the final rename fails it is
/// moved back.
pub(super) fn finalize(staging: TempDir, dest: &Path) -> Result<PathBuf, PipelineError> {
    let write_err = |e: std::io::Error| PipelineError::write(Stage::Finalize, dest, e);
    set_bundle_permissions(staging.path()).map_err(write_err)?;

    let previous = if dest.exists() {
        tracing::info!("replacing existing bundle at {}", dest.display());
        let parent = dest.parent().unwrap_or_else(|| Path::new("."));
        let holding = tempfile::Builder::new()
            .prefix(PREVIOUS_PREFIX)
            .tempdir_in(parent)
            .map_err(write_err)?;
        let aside = holding.path().join("bundle");
        fs::rename(dest, &aside).map_err(write_err)?;
        Some((holding, aside))
    } else {
        None
    };

    // Same filesystem as `dest` (both under the output root), so this is a rename.
    if let Err(e) = fs::rename(staging.path(), dest) {
        if let Some((holding, aside)) = previous {
            if let Err(restore) = fs::rename(&aside, dest) {
                // Keep the holding directory so the old bundle is not lost.
                let kept = holding.into_path();
                tracing::error!(
                    "could not restore previous bundle {} (left in {}): {}",
                    dest.display(),
                    kept.display(),
                    restore
                );
            }
        }
        return Err(write_err(e));
    }
    // The guard's cleanup now finds nothing to remove.
    drop(staging);

    if let Some((holding, _)) = previous {
        let path = holding.path().to_path_buf();
        if let Err(e) = holding.close() {
            tracing::warn!("could not remove previous bundle at {}: {}", path.display(), e);
        }
    }
    Ok(dest.to_path_buf())
}

/// Staging directories are created owner-only; a finished bundle is world-readable.
#[cfg(unix)]
fn set_bundle_permissions(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(BUNDLE_DIR_MODE))
}

#[cfg(not(unix))]
fn set_bundle_permissions(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
