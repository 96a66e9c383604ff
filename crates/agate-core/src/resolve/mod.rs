//! Upload-scoped asset index.
//!
//! HTML extracted from arbitrary ZIPs references assets by arbitrary
//! relative conventions; the index reconstructs intended references without
//! ever resolving outside the upload's own file set. It is a read-side
//! cache derived from extraction results; the store stays the source of
//! truth.

pub mod cache;
pub mod path;

pub use cache::IndexCache;

use std::collections::HashMap;

use crate::archive::ExtractedEntry;
use crate::store::StoredAsset;

/// Lookup structures for one upload: a normalized-path map and a basename
/// multimap (ambiguous when a basename has more than one candidate).
#[derive(Debug, Clone)]
pub struct AssetIndex {
    upload_id: String,
    by_path: HashMap<String, StoredAsset>,
    by_basename: HashMap<String, Vec<StoredAsset>>,
}

impl AssetIndex {
    /// Build the index over one upload's extracted entries.
    ///
    /// Keys are lowercased for case-insensitive lookup; the stored values
    /// keep their original case.
    pub fn build(upload_id: impl Into<String>, entries: &[ExtractedEntry]) -> Self {
        let mut by_path: HashMap<String, StoredAsset> = HashMap::new();
        let mut by_basename: HashMap<String, Vec<StoredAsset>> = HashMap::new();

        for entry in entries {
            let norm = path::normalize(&entry.archive_path);
            if norm.is_empty() {
                continue;
            }
            by_path
                .entry(norm.to_ascii_lowercase())
                .or_insert_with(|| entry.asset.clone());
            by_basename
                .entry(path::basename(&norm).to_ascii_lowercase())
                .or_default()
                .push(entry.asset.clone());
        }

        Self {
            upload_id: upload_id.into(),
            by_path,
            by_basename,
        }
    }

    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Resolve an asset reference found in `html_path`, short-circuiting on
    /// the first match:
    ///
    /// 1. absolute/external references are unresolvable (not an error);
    /// 2. the reference joined against the HTML file's directory (refusing
    ///    joins that escape the tree);
    /// 3. the reference as if already root-relative;
    /// 4. basename, only when exactly one candidate shares it (an
    ///    ambiguous basename is no match, never a guess).
    pub fn resolve(&self, html_path: &str, asset_ref: &str) -> Option<&StoredAsset> {
        if is_external_ref(asset_ref) {
            return None;
        }
        let cleaned = strip_query_fragment(asset_ref);
        if cleaned.is_empty() {
            return None;
        }

        if let Some(joined) = path::join_relative(html_path, cleaned) {
            if let Some(asset) = self.by_path.get(&joined.to_ascii_lowercase()) {
                return Some(asset);
            }
        }

        let root_rel = path::normalize(cleaned);
        if let Some(asset) = self.by_path.get(&root_rel.to_ascii_lowercase()) {
            return Some(asset);
        }

        let base = path::basename(&root_rel).to_ascii_lowercase();
        match self.by_basename.get(&base) {
            Some(candidates) if candidates.len() == 1 => Some(&candidates[0]),
            _ => None,
        }
    }
}

/// True for references the pipeline must pass through untouched: empty,
/// fragment-only, protocol-relative, or any absolute URL (`http:`, `data:`,
/// `mailto:`, `javascript:`, ...).
pub fn is_external_ref(reference: &str) -> bool {
    let r = reference.trim();
    if r.is_empty() || r.starts_with('#') || r.starts_with("//") {
        return true;
    }
    url::Url::parse(r).is_ok()
}

fn strip_query_fragment(reference: &str) -> &str {
    let end = reference
        .find(['?', '#'])
        .unwrap_or(reference.len());
    &reference[..end]
}
