//! CLI command handlers, one per file.

mod config_path;
mod grab;
mod manifest;
mod verify;

pub use config_path::run_config_path;
pub use grab::{run_grab, GrabArgs};
pub use manifest::run_manifest;
pub use verify::run_verify;
