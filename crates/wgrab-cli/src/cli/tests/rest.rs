//! Tests for manifest, verify and config-path subcommands.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_manifest() {
    match parse(&["wgrab", "manifest", "https://dev.itch.io/game"]) {
        CliCommand::Manifest { url } => assert_eq!(url, "https://dev.itch.io/game"),
        _ => panic!("expected Manifest"),
    }
}

#[test]
fn cli_parse_verify() {
    match parse(&["wgrab", "verify", "games/my-game"]) {
        CliCommand::Verify { dir } => assert_eq!(dir, Path::new("games/my-game")),
        _ => panic!("expected Verify"),
    }
}

#[test]
fn cli_parse_config_path() {
    assert!(matches!(
        parse(&["wgrab", "config-path"]),
        CliCommand::ConfigPath
    ));
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["wgrab", "add", "https://x/"]).is_err());
}
