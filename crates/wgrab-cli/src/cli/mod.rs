//! CLI for wgrab, the web game bundle grabber.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wgrab_core::config;

use commands::{run_config_path, run_grab, run_manifest, run_verify, GrabArgs};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wgrab")]
#[command(about = "wgrab: save an embedded web game as a self-contained local bundle", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a game from its host page into `<out>/<name>/`.
    Grab {
        /// Host page URL (e.g. https://dev.itch.io/game).
        url: String,

        /// Bundle directory name (default: derived from the URL).
        #[arg(long)]
        name: Option<String>,

        /// Output root directory (default: `output_dir` from config, else the current directory).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Maximum concurrent asset downloads (overrides config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Resolve the embedded game and list its build assets without downloading.
    Manifest {
        /// Host page URL.
        url: String,
    },

    /// Re-check the canonical files of a bundle against its game_info.json.
    Verify {
        /// Bundle directory.
        dir: PathBuf,
    },

    /// Print the config file location.
    ConfigPath,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Grab {
                url,
                name,
                out,
                jobs,
            } => {
                run_grab(
                    &cfg,
                    GrabArgs {
                        url,
                        name,
                        out,
                        jobs,
                    },
                )
                .await?
            }
            CliCommand::Manifest { url } => run_manifest(&cfg, &url).await?,
            CliCommand::Verify { dir } => run_verify(&dir).await?,
            CliCommand::ConfigPath => run_config_path().await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
