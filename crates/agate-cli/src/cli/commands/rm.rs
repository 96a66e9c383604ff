//! Rm command: delete stored asset trees, one outcome per id.

use agate_core::config::IngestConfig;
use agate_core::store::{AssetStore, BulkDeleteStatus};
use anyhow::Result;

pub fn run_rm(cfg: &IngestConfig, ids: &[String]) -> Result<()> {
    let store = AssetStore::open(cfg.store_root()?)?;
    for (id, status) in store.bulk_delete(ids) {
        match status {
            BulkDeleteStatus::Deleted(outcome) => println!(
                "{id}: deleted {} file(s), reclaimed {} bytes",
                outcome.deleted_paths.len(),
                outcome.bytes_reclaimed
            ),
            BulkDeleteStatus::NotFound => println!("{id}: not found"),
            BulkDeleteStatus::Failed(reason) => println!("{id}: failed: {reason}"),
        }
    }
    Ok(())
}
