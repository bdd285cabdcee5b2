//! `wgrab verify <dir>` – recompute SHA-256 of every canonical file in a bundle.

use anyhow::{bail, Result};
use std::path::Path;
use wgrab_core::descriptor::{read_descriptor, sha256_path};

pub async fn run_verify(dir: &Path) -> Result<()> {
    let descriptor = read_descriptor(dir)?;
    let mut bad = 0usize;
    for (file, expected) in &descriptor.checksums {
        let status = match sha256_path(&dir.join(file)) {
            Ok(actual) if &actual == expected => "OK",
            Ok(_) => {
                bad += 1;
                "MISMATCH"
            }
            Err(e) => {
                tracing::debug!("verify {}: {:#}", file, e);
                bad += 1;
                "MISSING"
            }
        };
        println!("{:<9} {}", status, file);
    }
    if bad > 0 {
        bail!("{} of {} files failed verification", bad, descriptor.checksums.len());
    }
    println!("{} files OK ({})", descriptor.checksums.len(), descriptor.name);
    Ok(())
}
