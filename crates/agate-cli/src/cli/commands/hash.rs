//! Hash command: compute SHA-256 of a file.

use agate_core::checksum;
use anyhow::Result;
use std::path::Path;

/// Compute and print SHA-256 of the given file.
pub fn run_hash(path: &Path) -> Result<()> {
    let digest = checksum::sha256_path(path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
