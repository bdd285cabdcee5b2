//! Pipeline error taxonomy.
//!
//! Every fatal error carries the stage it came from and the URL (or local
//! path) being processed, so the caller can report where the run stopped.
//! Per-asset download failures are not errors at this level: they are
//! recorded in [`crate::fetcher::FetchResult`] and only escalate to
//! [`PipelineError::MissingRequiredRole`] after canonicalization.

use std::fmt;
use std::path::PathBuf;

use crate::canonical::Role;
use crate::retry::FetchError;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    Extract,
    Fetch,
    Canonicalize,
    Rewrite,
    Describe,
    Finalize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Resolve => "resolve",
            Stage::Extract => "extract",
            Stage::Fetch => "fetch",
            Stage::Canonicalize => "canonicalize",
            Stage::Rewrite => "rewrite",
            Stage::Describe => "describe",
            Stage::Finalize => "finalize",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Host page or embed page could not be retrieved.
    #[error("[{stage}] failed to fetch {url}: {source}")]
    Transport {
        stage: Stage,
        url: String,
        #[source]
        source: FetchError,
    },

    /// None of the resolver strategies found an embedded game frame.
    #[error("[resolve] no embedded game found on {url}; the page may not have a web build")]
    EmbedNotFound { url: String },

    /// Neither the script scan nor the config scan found any build asset.
    #[error("[extract] no build assets referenced by {url}")]
    ManifestEmpty { url: String },

    /// A role needed to boot the bundle is absent after canonicalization.
    #[error("[canonicalize] bundle from {url} is missing required role(s): {}", join_roles(missing))]
    MissingRequiredRole { url: String, missing: Vec<Role> },

    /// Local filesystem operation failed.
    #[error("[{stage}] filesystem error at {}: {source}", path.display())]
    Write {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The caller cancelled the run; checked at stage boundaries.
    #[error("[{stage}] run cancelled")]
    Cancelled { stage: Stage },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Transport { stage, .. }
            | PipelineError::Write { stage, .. }
            | PipelineError::Cancelled { stage } => *stage,
            PipelineError::EmbedNotFound { .. } => Stage::Resolve,
            PipelineError::ManifestEmpty { .. } => Stage::Extract,
            PipelineError::MissingRequiredRole { .. } => Stage::Canonicalize,
        }
    }

    pub(crate) fn write(stage: Stage, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Write {
            stage,
            path: path.into(),
            source,
        }
    }
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
