//! Decode pass: rename percent-encoded build files to their decoded names.

use std::fs;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::error::{PipelineError, Stage};

/// Decoded form of `file_name`, or `None` when it has no escapes, does not
/// decode to valid UTF-8, or would decode into a path separator.
fn decoded_name(file_name: &str) -> Option<String> {
    if !file_name.contains('%') {
        return None;
    }
    let decoded = percent_decode_str(file_name).decode_utf8().ok()?;
    if decoded == file_name || decoded.contains(['/', '\\', '\0']) {
        return None;
    }
    Some(decoded.into_owned())
}

/// Renames every file in `files` (relative to `bundle_dir`) whose name holds
/// percent escapes to its decoded form, in place. Returns the post-rename
/// relative paths in the same order.
///
/// If the decoded name is already taken, the rename is skipped and the
/// existing decoded file stands in for it.
pub fn decode_file_names(
    bundle_dir: &Path,
    files: &[PathBuf],
) -> Result<Vec<PathBuf>, PipelineError> {
    let mut out = Vec::with_capacity(files.len());
    for rel in files {
        let Some(decoded) = rel
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(decoded_name)
        else {
            out.push(rel.clone());
            continue;
        };

        let target_rel = rel.with_file_name(&decoded);
        let from = bundle_dir.join(rel);
        let to = bundle_dir.join(&target_rel);
        if to.exists() {
            tracing::debug!(
                from = %rel.display(),
                to = %target_rel.display(),
                "decoded name already present; keeping existing file"
            );
        } else {
            fs::rename(&from, &to).map_err(|e| PipelineError::write(Stage::Canonicalize, &from, e))?;
            tracing::info!("renamed {} -> {}", rel.display(), target_rel.display());
        }
        out.push(target_rel);
    }
    Ok(out)
}
