//! Archive handling: capability gate, extraction policy, per-entry outcomes,
//! policy-gated extraction, and central-directory preview.

pub mod extract;
pub mod outcome;
pub mod policy;
pub mod preview;

pub use extract::{extract, ExtractDeps, StructuralError};
pub use outcome::{
    priority_for_mime, ExtractedEntry, ExtractionReport, SkipReason, SkippedEntry,
};
pub use policy::ExtractionPolicy;
pub use preview::{preview, ArchivePreview, PreviewEntry, PreviewError};

/// Whether archive extraction support is present.
///
/// Checked once at startup and injected into the extractor, rather than
/// probed per call. With `Unavailable`, extraction degrades to a
/// `capability-unavailable` report instead of an error, so callers can
/// surface a clear diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveSupport {
    Available,
    Unavailable,
}

impl ArchiveSupport {
    /// Detect extraction support. The ZIP codec is linked statically, so a
    /// normal build always reports `Available`; `Unavailable` is constructed
    /// by hosts that disable extraction.
    pub const fn detect() -> Self {
        ArchiveSupport::Available
    }

    pub const fn is_available(self) -> bool {
        matches!(self, ArchiveSupport::Available)
    }
}
