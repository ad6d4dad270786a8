//! `ghrel checksum <path>` – print SHA-256 of a file, sha256sum style.

use anyhow::Result;
use ghrel_core::digest;
use std::path::Path;

pub fn run_checksum(path: &Path) -> Result<()> {
    let digest = digest::sha256_path(path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
