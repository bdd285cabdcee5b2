pub mod config;
pub mod logging;

// Pipeline stages, in execution order
pub mod resolver;
pub mod manifest;
pub mod fetcher;
pub mod canonical;
pub mod rewriter;
pub mod descriptor;
pub mod pipeline;

pub mod control;
pub mod error;
pub mod http;
pub mod retry;
pub mod url_model;

pub use control::CancelToken;
pub use error::{PipelineError, Stage};
pub use pipeline::{BundleReport, BundleRequest, Pipeline, PipelineOptions};
