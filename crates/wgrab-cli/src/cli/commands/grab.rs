//! `wgrab grab <url>` – run the full pipeline for one host page.

use anyhow::{Context, Result};
use std::path::PathBuf;
use wgrab_core::config::WgrabConfig;
use wgrab_core::descriptor::LAUNCHER_FILE;
use wgrab_core::fetcher::FetchStatus;
use wgrab_core::http::CurlTransport;
use wgrab_core::{BundleReport, BundleRequest, CancelToken, Pipeline, PipelineOptions};

#[derive(Debug, Clone)]
pub struct GrabArgs {
    pub url: String,
    pub name: Option<String>,
    pub out: Option<PathBuf>,
    pub jobs: Option<usize>,
}

pub async fn run_grab(cfg: &WgrabConfig, args: GrabArgs) -> Result<()> {
    let out_root = match args.out.or_else(|| cfg.output_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let mut options = PipelineOptions::from_config(cfg);
    if let Some(jobs) = args.jobs {
        options.max_concurrent_fetches = jobs.max(1);
    }
    let pipeline = Pipeline::new(CurlTransport::from_config(cfg), options);
    let request = BundleRequest {
        source_url: args.url,
        out_root,
        name: args.name,
    };
    println!(
        "Grabbing {} -> {}",
        request.source_url,
        request.out_root.join(request.bundle_name()).display()
    );

    // Ctrl-C stops the run at the next stage boundary or asset.
    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ncancelling after in-flight downloads...");
            on_signal.cancel();
        }
    });

    let result = tokio::task::spawn_blocking(move || pipeline.run(&request, &cancel))
        .await
        .context("pipeline task failed")?;
    watcher.abort();

    let report = result?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &BundleReport) {
    println!("Bundle ready: {}", report.bundle_dir.display());
    println!("  embed:  {}", report.embed_url);
    println!(
        "  assets: {} downloaded, {} failed",
        report.fetched(),
        report.failed()
    );
    for r in &report.fetch_results {
        if let FetchStatus::Failed(e) = &r.status {
            println!("    failed {}: {}", r.reference.relative_path, e);
        }
    }
    let roles: Vec<&str> = report.roles().iter().map(|r| r.as_str()).collect();
    println!("  roles:  {}", roles.join(", "));
    for w in &report.warnings {
        println!("  warning: {}", w);
    }
    println!("Serve the directory over HTTP and open {}.", LAUNCHER_FILE);
}
