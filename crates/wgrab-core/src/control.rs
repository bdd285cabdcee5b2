//! Run cancellation: a shared abort flag checked between units of work.
//!
//! The pipeline checks the token at every stage boundary and the fetcher
//! checks it before each asset request. A fetch already in flight runs to
//! completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{PipelineError, Stage};

/// Cloneable abort token; all clones share one flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation (e.g. from a Ctrl-C handler).
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` if cancellation was requested before entering `stage`.
    pub fn check(&self, stage: Stage) -> Result<(), PipelineError> {
        if self.is_cancelled() {
            tracing::info!(%stage, "cancellation requested; stopping");
            return Err(PipelineError::Cancelled { stage });
        }
        Ok(())
    }
}
