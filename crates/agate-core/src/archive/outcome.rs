//! Outcome taxonomy for archive extraction.
//!
//! Every non-directory archive member resolves to exactly one outcome:
//! accepted (committed to the store) or skipped with a stable reason code;
//! never both, never silently dropped. Reason codes are part of the public
//! surface; callers build user-facing diagnostics from them.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::scanner::Verdict;
use crate::store::StoredAsset;

/// Why one archive member was rejected. Policy rejections only: a reason
/// here never escalates to a hard failure for the whole call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Entry name contains `..`.
    PathTraversal,
    /// macOS resource-fork / Finder artifacts (`._*`, `.DS_Store`, `__MACOSX/`).
    MacMetadata,
    /// Wrong password or corrupt entry, deliberately not distinguished.
    DecryptFailed,
    /// Decompressed size exceeds the per-entry cap.
    PerFileSizeLimit,
    /// Sniffed MIME type is not in the allowlist.
    DisallowedMime(String),
    /// Scan verdict other than clean (including scanner-unavailable).
    Virus(Verdict),
    /// Filesystem write failed during commit. Not retried here.
    StoreFailed,
    /// Extraction support itself is absent from the runtime.
    CapabilityUnavailable,
}

impl SkipReason {
    /// Stable reason code, e.g. `disallowed-mime:text/html` or
    /// `virus:UNAVAILABLE`.
    pub fn code(&self) -> String {
        match self {
            SkipReason::PathTraversal => "path-traversal".to_string(),
            SkipReason::MacMetadata => "mac-metadata".to_string(),
            SkipReason::DecryptFailed => "decrypt-failed".to_string(),
            SkipReason::PerFileSizeLimit => "per-file-size-limit".to_string(),
            SkipReason::DisallowedMime(mime) => format!("disallowed-mime:{mime}"),
            SkipReason::Virus(verdict) => format!("virus:{verdict}"),
            SkipReason::StoreFailed => "store-failed".to_string(),
            SkipReason::CapabilityUnavailable => "capability-unavailable".to_string(),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for SkipReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code())
    }
}

/// A rejected member: its path (when known) and why.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub path: Option<String>,
    pub reason: SkipReason,
}

/// An accepted member, committed to the store.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedEntry {
    pub asset: StoredAsset,
    /// Path as recorded in the archive, used to build the asset index.
    pub archive_path: String,
    /// Ordering score (HTML > images > PDF > text > other). Display
    /// convenience only, never a policy input.
    pub priority: u8,
    /// Directory depth of `archive_path` (0 for top-level entries).
    pub depth: usize,
}

/// What one extraction call produced and rejected.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub extracted: Vec<ExtractedEntry>,
    pub skipped: Vec<SkippedEntry>,
    /// False only when extraction support was unavailable.
    pub used_library: bool,
}

impl ExtractionReport {
    /// The degraded report returned when the archive codec is absent.
    pub fn capability_unavailable() -> Self {
        Self {
            extracted: Vec::new(),
            skipped: vec![SkippedEntry {
                path: None,
                reason: SkipReason::CapabilityUnavailable,
            }],
            used_library: false,
        }
    }
}

/// Priority score for ordering accepted entries.
pub fn priority_for_mime(mime: &str) -> u8 {
    match mime {
        "text/html" => 4,
        m if m.starts_with("image/") => 3,
        "application/pdf" => 2,
        "text/plain" => 1,
        _ => 0,
    }
}
