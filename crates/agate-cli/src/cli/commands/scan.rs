//! Scan command: clamd verdict for a file, or a daemon health check.

use agate_core::config::IngestConfig;
use agate_core::scanner::{self, Verdict};
use anyhow::{Context, Result};
use std::path::Path;

pub async fn run_scan(cfg: &IngestConfig, path: Option<&Path>, ping: bool) -> Result<()> {
    let endpoint = cfg.clamd_endpoint();

    if ping {
        if scanner::ping(&endpoint).await {
            println!("clamd at {}:{} answered PONG", endpoint.host, endpoint.port);
            return Ok(());
        }
        anyhow::bail!("clamd at {}:{} is unreachable", endpoint.host, endpoint.port);
    }

    let path = path.context("a file path is required unless --ping is given")?;
    let bytes =
        std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    match scanner::scan_bytes(&bytes, &endpoint).await {
        Verdict::Clean => println!("{}: CLEAN", path.display()),
        Verdict::Found(name) => println!("{}: {} FOUND", path.display(), name),
        Verdict::Unavailable => {
            anyhow::bail!("scanner unavailable; treat {} as untrusted", path.display())
        }
    }
    Ok(())
}
