//! Policy-gated ZIP extraction.
//!
//! The archive is walked serially (the ZIP reader is a sequential cursor
//! over one buffer): name policy, decryption, and size-capped inflation
//! happen in archive order. Surviving payloads are then sniffed, scanned,
//! and committed on a bounded set of tokio workers; each worker writes its
//! outcome into a slot keyed by archive index, and the report is assembled
//! in archive order once every slot resolves, so caller-visible ordering is
//! deterministic regardless of completion order.
//!
//! No single bad entry aborts the call. The whole call fails only when the
//! container cannot be opened at all.

use std::io::{Cursor, Read};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use zip::ZipArchive;

use super::outcome::{
    priority_for_mime, ExtractedEntry, ExtractionReport, SkipReason, SkippedEntry,
};
use super::policy::ExtractionPolicy;
use super::ArchiveSupport;
use crate::scanner::{self, ClamdEndpoint, Verdict};
use crate::sniff;
use crate::store::AssetStore;

/// Hard failure for the whole call: no partial result is meaningful.
#[derive(Debug, Error)]
pub enum StructuralError {
    #[error("malformed zip container: {0}")]
    Malformed(String),
    #[error("extraction worker failed: {0}")]
    Worker(String),
}

/// Collaborators injected into one extraction call.
pub struct ExtractDeps<'a> {
    pub support: ArchiveSupport,
    pub store: &'a AssetStore,
    pub clamd: &'a ClamdEndpoint,
    /// Bound on concurrent sniff/scan/commit workers.
    pub workers: usize,
}

enum EntryOutcome {
    Accepted(ExtractedEntry),
    Skipped(SkippedEntry),
}

enum Staged {
    Skipped(SkippedEntry),
    Candidate { path: String, bytes: Vec<u8> },
}

/// Apply `policy` to every member of `zip_bytes` and commit the survivors.
pub async fn extract(
    zip_bytes: &[u8],
    password: Option<&str>,
    policy: &ExtractionPolicy,
    deps: &ExtractDeps<'_>,
) -> Result<ExtractionReport, StructuralError> {
    if !deps.support.is_available() {
        tracing::warn!("archive support unavailable; returning degraded report");
        return Ok(ExtractionReport::capability_unavailable());
    }

    let staged = stage_entries(zip_bytes, password, policy.per_entry_max_bytes)?;

    let shared_policy = Arc::new(policy.clone());
    let semaphore = Arc::new(Semaphore::new(deps.workers.max(1)));
    let mut slots: Vec<Option<EntryOutcome>> = (0..staged.len()).map(|_| None).collect();
    let mut join_set = JoinSet::new();

    for (index, item) in staged.into_iter().enumerate() {
        match item {
            Staged::Skipped(s) => slots[index] = Some(EntryOutcome::Skipped(s)),
            Staged::Candidate { path, bytes } => {
                let semaphore = Arc::clone(&semaphore);
                let policy = Arc::clone(&shared_policy);
                let store = deps.store.clone();
                let clamd = deps.clamd.clone();
                join_set.spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    (index, process_candidate(path, bytes, &policy, &store, &clamd).await)
                });
            }
        }
    }

    while let Some(joined) = join_set.join_next().await {
        let (index, outcome) = joined.map_err(|e| StructuralError::Worker(e.to_string()))?;
        slots[index] = Some(outcome);
    }

    let mut extracted = Vec::new();
    let mut skipped = Vec::new();
    for slot in slots.into_iter().flatten() {
        match slot {
            EntryOutcome::Accepted(entry) => extracted.push(entry),
            EntryOutcome::Skipped(entry) => skipped.push(entry),
        }
    }
    if shared_policy.prioritize_html {
        // Stable sort: archive order is preserved within a priority class.
        extracted.sort_by_key(|e| std::cmp::Reverse(e.priority));
    }
    tracing::info!(
        accepted = extracted.len(),
        skipped = skipped.len(),
        "extraction finished"
    );
    Ok(ExtractionReport {
        extracted,
        skipped,
        used_library: true,
    })
}

/// Serial pass: walk the central directory in order, applying the name
/// policy and inflating survivors under the per-entry cap.
fn stage_entries(
    zip_bytes: &[u8],
    password: Option<&str>,
    cap: Option<u64>,
) -> Result<Vec<Staged>, StructuralError> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes))
        .map_err(|e| StructuralError::Malformed(e.to_string()))?;

    let mut staged = Vec::new();
    for index in 0..archive.len() {
        let (raw_path, is_dir) = {
            let meta = archive
                .by_index_raw(index)
                .map_err(|e| StructuralError::Malformed(e.to_string()))?;
            (meta.name().to_string(), meta.is_dir())
        };
        if is_dir {
            // Directories are structure, not members; not reported as skips.
            continue;
        }
        if raw_path.contains("..") {
            staged.push(skip(raw_path, SkipReason::PathTraversal));
            continue;
        }
        if is_mac_metadata(&raw_path) {
            staged.push(skip(raw_path, SkipReason::MacMetadata));
            continue;
        }
        match read_entry(&mut archive, index, password, cap) {
            Ok(bytes) => staged.push(Staged::Candidate {
                path: raw_path,
                bytes,
            }),
            Err(reason) => staged.push(skip(raw_path, reason)),
        }
    }
    Ok(staged)
}

fn skip(path: String, reason: SkipReason) -> Staged {
    tracing::debug!(path = %path, reason = %reason, "entry skipped");
    Staged::Skipped(SkippedEntry {
        path: Some(path),
        reason,
    })
}

/// Decrypt and inflate one entry, enforcing the size cap during inflation
/// so a lying size header cannot exhaust memory. Wrong password and corrupt
/// payload both map to `DecryptFailed`; not distinguished.
fn read_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    index: usize,
    password: Option<&str>,
    cap: Option<u64>,
) -> Result<Vec<u8>, SkipReason> {
    let opened = match password {
        Some(pw) => archive.by_index_decrypt(index, pw.as_bytes()),
        None => archive.by_index(index),
    };
    let mut file = opened.map_err(|_| SkipReason::DecryptFailed)?;

    let mut bytes = Vec::new();
    match cap {
        Some(cap) => {
            let mut limited = (&mut file).take(cap.saturating_add(1));
            limited
                .read_to_end(&mut bytes)
                .map_err(|_| SkipReason::DecryptFailed)?;
            if bytes.len() as u64 > cap {
                return Err(SkipReason::PerFileSizeLimit);
            }
        }
        None => {
            file.read_to_end(&mut bytes)
                .map_err(|_| SkipReason::DecryptFailed)?;
        }
    }
    Ok(bytes)
}

/// Concurrent pass: sniff, scan, commit. Pure policy application; never
/// touches the archive cursor.
async fn process_candidate(
    path: String,
    bytes: Vec<u8>,
    policy: &ExtractionPolicy,
    store: &AssetStore,
    clamd: &ClamdEndpoint,
) -> EntryOutcome {
    let detected = sniff::detect(&bytes, Some(entry_basename(&path)));
    if !policy.allows_mime(detected.mime) {
        tracing::debug!(path = %path, mime = detected.mime, "entry mime not allowed");
        return skipped_outcome(path, SkipReason::DisallowedMime(detected.mime.to_string()));
    }

    if policy.virus_scan {
        let verdict = scanner::scan_bytes(&bytes, clamd).await;
        if verdict != Verdict::Clean {
            return skipped_outcome(path, SkipReason::Virus(verdict));
        }
    }

    match store.save(&bytes, entry_basename(&path)) {
        Ok(asset) => EntryOutcome::Accepted(ExtractedEntry {
            priority: priority_for_mime(&asset.detected_mime),
            depth: entry_depth(&path),
            archive_path: path,
            asset,
        }),
        Err(err) => {
            tracing::warn!(path = %path, error = %err, "store commit failed");
            skipped_outcome(path, SkipReason::StoreFailed)
        }
    }
}

fn skipped_outcome(path: String, reason: SkipReason) -> EntryOutcome {
    tracing::debug!(path = %path, reason = %reason, "entry skipped");
    EntryOutcome::Skipped(SkippedEntry {
        path: Some(path),
        reason,
    })
}

fn entry_basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn entry_depth(path: &str) -> usize {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .count()
        .saturating_sub(1)
}

fn is_mac_metadata(path: &str) -> bool {
    if path.contains("__MACOSX/") || path.contains("/.AppleDouble/") {
        return true;
    }
    let base = entry_basename(path);
    base == ".DS_Store" || base.starts_with("._")
}
