//! `wgrab manifest <url>` – list build assets without downloading them.

use anyhow::{Context, Result};
use wgrab_core::config::WgrabConfig;
use wgrab_core::http::CurlTransport;
use wgrab_core::{Pipeline, PipelineOptions};

pub async fn run_manifest(cfg: &WgrabConfig, url: &str) -> Result<()> {
    let pipeline = Pipeline::new(
        CurlTransport::from_config(cfg),
        PipelineOptions::from_config(cfg),
    );
    let url = url.to_string();
    let preview = tokio::task::spawn_blocking(move || pipeline.preview(&url))
        .await
        .context("manifest task failed")??;

    println!("Embed: {}", preview.embed_url);
    println!("{:<40} {}", "PATH", "URL");
    for r in preview.manifest.references() {
        println!("{:<40} {}", r.relative_path, r.absolute_url);
    }
    Ok(())
}
