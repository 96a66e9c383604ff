//! Preview command: list central-directory entries without extracting.

use agate_core::archive;
use agate_core::config::IngestConfig;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run_preview(cfg: &IngestConfig, path: &Path, max_entries: Option<usize>) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let cap = max_entries.unwrap_or(cfg.limits.max_preview_entries);
    let preview = archive::preview(&bytes, cap)?;

    println!(
        "{} entr{}{}",
        preview.total_entries,
        if preview.total_entries == 1 { "y" } else { "ies" },
        if preview.truncated { " (list truncated)" } else { "" }
    );
    for entry in &preview.entries {
        let mut flags = String::new();
        if entry.encrypted {
            flags.push_str("  [encrypted]");
        }
        if entry.is_dir {
            flags.push_str("  [dir]");
        }
        println!(
            "  {:>10} -> {:>10}  {}{}",
            entry.compressed_size, entry.uncompressed_size, entry.name, flags
        );
    }
    Ok(())
}
