//! Content-addressable asset store.
//!
//! Each committed buffer lives under an id-scoped directory:
//! `{root}/{id}/{sanitized_name}`. Ids are UUIDv4 and never reused; writes
//! are create-only, so a given id's tree is append-only for the duration of
//! one save and needs no cross-id locking. Deleting an id racing a reader is
//! a best-effort race: the reader may see "not found", which is acceptable
//! for write-once assets.
//!
//! The boundary that serves files must go through [`AssetStore::validated_path`],
//! which re-checks containment under the store root independent of name
//! sanitization.

mod sanitize;

pub use sanitize::sanitize_asset_name;

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::checksum;
use crate::sniff;

/// A committed asset. `id` is unique per ingestion and never reused;
/// `sanitized_name` matches `[A-Za-z0-9._-]+`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAsset {
    pub id: String,
    pub sanitized_name: String,
    pub size_bytes: u64,
    pub detected_mime: String,
    pub content_hash: String,
}

impl StoredAsset {
    /// Public serving path under the store's URL scheme:
    /// `{base}/{id}/{sanitized_name}`.
    pub fn public_path(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}",
            base_url.trim_end_matches('/'),
            self.id,
            self.sanitized_name
        )
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("resolved path escapes the store root")]
    OutsideRoot,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// What a tree deletion reclaimed, for auditing and quota accounting.
#[derive(Debug, Clone, Default)]
pub struct DeleteOutcome {
    pub deleted_paths: Vec<PathBuf>,
    pub bytes_reclaimed: u64,
}

/// Per-id outcome of a bulk delete. One id's failure never aborts the batch.
#[derive(Debug, Clone)]
pub enum BulkDeleteStatus {
    Deleted(DeleteOutcome),
    NotFound,
    Failed(String),
}

/// Filesystem-backed store rooted at one directory.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for an id. Pure path composition, no disk access.
    pub fn dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    /// Path for a named file under an id. Pure path composition.
    pub fn path(&self, id: &str, name: &str) -> PathBuf {
        self.dir(id).join(name)
    }

    /// Commit a buffer under a fresh id and the sanitized original name.
    ///
    /// Never overwrites: the id directory is new and the file is opened with
    /// `create_new`.
    pub fn save(&self, buf: &[u8], original_name: &str) -> Result<StoredAsset, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let name = sanitize_asset_name(original_name);
        let dir = self.dir(&id);
        fs::create_dir_all(&dir)?;

        let path = dir.join(&name);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        file.write_all(buf)?;

        let detected = sniff::detect(buf, Some(original_name));
        let asset = StoredAsset {
            sanitized_name: name,
            size_bytes: buf.len() as u64,
            detected_mime: detected.mime.to_string(),
            content_hash: checksum::sha256_bytes(buf),
            id,
        };
        tracing::debug!(
            id = %asset.id,
            name = %asset.sanitized_name,
            mime = %asset.detected_mime,
            size = asset.size_bytes,
            "stored asset"
        );
        Ok(asset)
    }

    /// Resolve `{id}/{name}` for serving, enforcing the traversal defense.
    ///
    /// The composed path is canonicalized and must remain strictly inside the
    /// store root, independent of whatever sanitization happened at write
    /// time, since `id`/`name` may come from an external request here.
    pub fn validated_path(&self, id: &str, name: &str) -> Result<PathBuf, StoreError> {
        let root = self.root.canonicalize()?;
        let candidate = self.path(id, name);
        let resolved = candidate.canonicalize().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(format!("{id}/{name}"))
            } else {
                StoreError::Io(e)
            }
        })?;
        if resolved.starts_with(&root) && resolved != root {
            Ok(resolved)
        } else {
            Err(StoreError::OutsideRoot)
        }
    }

    /// Recursively delete an id's tree, reporting what was reclaimed.
    /// A missing directory is not an error (best-effort; empty outcome).
    pub fn delete_tree(&self, id: &str) -> Result<DeleteOutcome, StoreError> {
        let dir = self.dir(id);
        if !dir.exists() {
            return Ok(DeleteOutcome::default());
        }
        let mut outcome = DeleteOutcome::default();
        collect_tree(&dir, &mut outcome)?;
        fs::remove_dir_all(&dir)?;
        tracing::info!(
            id,
            files = outcome.deleted_paths.len(),
            bytes = outcome.bytes_reclaimed,
            "deleted asset tree"
        );
        Ok(outcome)
    }

    /// Delete many ids, isolating failures per id.
    pub fn bulk_delete(&self, ids: &[String]) -> Vec<(String, BulkDeleteStatus)> {
        ids.iter()
            .map(|id| {
                let status = if !self.dir(id).exists() {
                    BulkDeleteStatus::NotFound
                } else {
                    match self.delete_tree(id) {
                        Ok(outcome) => BulkDeleteStatus::Deleted(outcome),
                        Err(err) => BulkDeleteStatus::Failed(err.to_string()),
                    }
                };
                (id.clone(), status)
            })
            .collect()
    }

    /// List stored ids (directory names under the root), sorted.
    pub fn inventory(&self) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                ids.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

fn collect_tree(dir: &Path, outcome: &mut DeleteOutcome) -> Result<(), StoreError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let meta = entry.metadata()?;
        if meta.is_dir() {
            collect_tree(&path, outcome)?;
        } else {
            outcome.bytes_reclaimed += meta.len();
            outcome.deleted_paths.push(path);
        }
    }
    Ok(())
}
