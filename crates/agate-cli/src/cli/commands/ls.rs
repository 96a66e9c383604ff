//! Ls command: list stored asset ids.

use agate_core::config::IngestConfig;
use agate_core::store::AssetStore;
use anyhow::Result;

pub fn run_ls(cfg: &IngestConfig) -> Result<()> {
    let store = AssetStore::open(cfg.store_root()?)?;
    for id in store.inventory()? {
        println!("{id}");
    }
    Ok(())
}
