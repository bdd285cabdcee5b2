//! Asset Fetcher: downloads every manifest entry into the bundle directory.
//!
//! Runs at most `max_concurrent` downloads at once, each retried with
//! backoff per [`RetryPolicy`]. A failed asset never aborts the others; the
//! caller gets one [`FetchResult`] per manifest entry, in manifest order, and
//! decides later (after canonicalization) whether the bundle is usable.

mod asset;

pub use asset::{temp_path, TEMP_SUFFIX};

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Mutex;

use crate::control::CancelToken;
use crate::http::Transport;
use crate::manifest::{AssetManifest, AssetReference};
use crate::retry::{FetchError, RetryPolicy};

/// Why a single asset could not be stored.
#[derive(Debug, thiserror::Error)]
pub enum AssetFetchError {
    #[error("{0}")]
    Transport(#[source] FetchError),
    #[error("asset path escapes the bundle directory")]
    UnsafePath,
    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),
    #[error("cancelled before download")]
    Cancelled,
}

#[derive(Debug)]
pub enum FetchStatus {
    /// Stored at `local_path` (relative to the bundle directory).
    Success { local_path: PathBuf, bytes: u64 },
    Failed(AssetFetchError),
}

/// Outcome for one manifest entry.
#[derive(Debug)]
pub struct FetchResult {
    pub reference: AssetReference,
    pub status: FetchStatus,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self.status, FetchStatus::Success { .. })
    }

    pub fn local_path(&self) -> Option<&Path> {
        match &self.status {
            FetchStatus::Success { local_path, .. } => Some(local_path),
            FetchStatus::Failed(_) => None,
        }
    }
}

/// Local paths (relative to the bundle directory) of every stored asset, in manifest order.
pub fn fetched_paths(results: &[FetchResult]) -> Vec<PathBuf> {
    results
        .iter()
        .filter_map(|r| r.local_path().map(Path::to_path_buf))
        .collect()
}

/// Downloads every asset of `manifest` under `bundle_dir`, mirroring relative paths.
///
/// At most `max_concurrent` (minimum 1) requests are in flight. Once `cancel`
/// fires, queued assets are reported as `Cancelled` without being requested.
pub fn fetch_all(
    transport: &dyn Transport,
    policy: &RetryPolicy,
    manifest: &AssetManifest,
    bundle_dir: &Path,
    max_concurrent: usize,
    cancel: &CancelToken,
) -> Vec<FetchResult> {
    let count = manifest.len();
    if count == 0 {
        return Vec::new();
    }
    let work: Mutex<VecDeque<(usize, &AssetReference)>> =
        Mutex::new(manifest.into_iter().enumerate().collect());
    let (tx, rx) = mpsc::channel();
    let num_workers = max_concurrent.max(1).min(count);
    tracing::debug!(assets = count, workers = num_workers, "starting asset downloads");

    std::thread::scope(|scope| {
        for _ in 0..num_workers {
            let tx = tx.clone();
            let work = &work;
            scope.spawn(move || loop {
                let next = match work.lock() {
                    Ok(mut queue) => queue.pop_front(),
                    Err(poisoned) => poisoned.into_inner().pop_front(),
                };
                let Some((index, reference)) = next else {
                    break;
                };
                let res = if cancel.is_cancelled() {
                    Err(AssetFetchError::Cancelled)
                } else {
                    asset::fetch_asset(transport, policy, reference, bundle_dir)
                };
                let _ = tx.send((index, res));
            });
        }
    });
    drop(tx);

    let mut slots: Vec<Option<Result<(PathBuf, u64), AssetFetchError>>> =
        (0..count).map(|_| None).collect();
    for (index, res) in rx {
        slots[index] = Some(res);
    }

    manifest
        .into_iter()
        .zip(slots)
        .map(|(reference, slot)| {
            let status = match slot.unwrap_or(Err(AssetFetchError::Cancelled)) {
                Ok((local_path, bytes)) => {
                    tracing::info!("downloaded {} ({} bytes)", reference.relative_path, bytes);
                    FetchStatus::Success { local_path, bytes }
                }
                Err(e) => {
                    tracing::warn!(url = %reference.absolute_url, "failed to download {}: {}", reference.relative_path, e);
                    FetchStatus::Failed(e)
                }
            };
            FetchResult {
                reference: reference.clone(),
                status,
            }
        })
        .collect()
}
