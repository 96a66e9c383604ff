//! Sniff command: detect a file's content type from its bytes.

use agate_core::sniff;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run_sniff(path: &Path) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let name = path.file_name().map(|s| s.to_string_lossy().into_owned());
    let detected = sniff::detect(&bytes, name.as_deref());
    match detected.ext {
        Some(ext) => println!("{}  (.{})  {}", detected.mime, ext, path.display()),
        None => println!("{}  {}", detected.mime, path.display()),
    }
    Ok(())
}
