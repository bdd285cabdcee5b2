//! `wgrab config-path` – print where config.toml lives.

use anyhow::Result;
use wgrab_core::config;

pub async fn run_config_path() -> Result<()> {
    println!("{}", config::config_path()?.display());
    Ok(())
}
