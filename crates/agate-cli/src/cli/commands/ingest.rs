//! Ingest command: run one archive through the extraction pipeline.

use agate_core::archive::{self, ArchiveSupport, ExtractDeps};
use agate_core::config::IngestConfig;
use agate_core::store::AssetStore;
use anyhow::{Context, Result};
use std::path::Path;

pub async fn run_ingest(
    cfg: &IngestConfig,
    path: &Path,
    password: Option<&str>,
    no_scan: bool,
    keep_order: bool,
    json: bool,
) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let store = AssetStore::open(cfg.store_root()?)?;

    let mut policy = cfg.extraction_policy();
    if no_scan {
        policy.virus_scan = false;
    }
    if keep_order {
        policy.prioritize_html = false;
    }

    let clamd = cfg.clamd_endpoint();
    let deps = ExtractDeps {
        support: ArchiveSupport::detect(),
        store: &store,
        clamd: &clamd,
        workers: cfg.limits.extract_workers,
    };
    let report = archive::extract(&bytes, password, &policy, &deps).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "accepted {} / skipped {} (store: {})",
        report.extracted.len(),
        report.skipped.len(),
        store.root().display()
    );
    for entry in &report.extracted {
        println!(
            "  + {}  ({}, {} bytes) -> {}/{}",
            entry.archive_path,
            entry.asset.detected_mime,
            entry.asset.size_bytes,
            entry.asset.id,
            entry.asset.sanitized_name
        );
    }
    for skip in &report.skipped {
        println!(
            "  - {}  [{}]",
            skip.path.as_deref().unwrap_or("<archive>"),
            skip.reason
        );
    }
    Ok(())
}
