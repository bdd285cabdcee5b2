//! Single-asset GET streamed into a `.part` file, then renamed into place.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::AssetFetchError;
use crate::http::{RequestKind, Transport};
use crate::manifest::AssetReference;
use crate::retry::{run_with_retry, FetchError, RetryPolicy};
use crate::url_model::asset_local_path;

/// Temporary file suffix used before the atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Downloads one asset to its mirrored path under `bundle_dir`.
/// Returns the path relative to `bundle_dir` and the number of bytes written.
pub(super) fn fetch_asset(
    transport: &dyn Transport,
    policy: &RetryPolicy,
    reference: &AssetReference,
    bundle_dir: &Path,
) -> Result<(PathBuf, u64), AssetFetchError> {
    let rel = asset_local_path(&reference.relative_path).ok_or(AssetFetchError::UnsafePath)?;
    let dest = bundle_dir.join(&rel);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(AssetFetchError::Write)?;
    }
    let part = temp_path(&dest);
    let url = reference.absolute_url.as_str();

    let fetched = run_with_retry(policy, url, || {
        let file = File::create(&part).map_err(FetchError::Storage)?;
        let mut sink = BufWriter::new(file);
        let n = transport.fetch_into(url, RequestKind::Asset, &mut sink)?;
        sink.flush().map_err(FetchError::Storage)?;
        Ok(n)
    });

    match fetched {
        Ok(bytes) => {
            fs::rename(&part, &dest).map_err(AssetFetchError::Write)?;
            Ok((rel, bytes))
        }
        Err(e) => {
            let _ = fs::remove_file(&part);
            Err(AssetFetchError::Transport(e))
        }
    }
}
