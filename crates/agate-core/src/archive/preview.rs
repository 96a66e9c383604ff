//! Cheap archive preview from the central directory.
//!
//! Parses only the End-Of-Central-Directory record and the central-directory
//! entries (names, sizes, CRCs, flags) without decompressing any payload.
//! All sizes and offsets are untrusted and validated against the buffer
//! length before use. The entry list is capped to bound response size
//! against adversarially large entry counts; the total count is still
//! reported.

use serde::Serialize;
use thiserror::Error;

const SIG_EOCD: u32 = 0x0605_4b50;
const SIG_CDFH: u32 = 0x0201_4b50;

const EOCD_MIN_LEN: usize = 22;
/// 64 KiB max comment + header margin.
const EOCD_SEARCH_MAX: usize = 66 * 1024;
/// Central directory fixed header length.
const CDFH_LEN: usize = 46;

/// Zip64 sentinel values in 16/32-bit fields.
const SENTINEL_U16: u16 = 0xffff;
const SENTINEL_U32: u32 = 0xffff_ffff;

/// Preview failure. Returned, not thrown: an unlocatable EOCD is the normal
/// answer for a non-ZIP buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreviewError {
    #[error("end-of-central-directory record not found")]
    NoEocd,
    #[error("central directory is malformed")]
    Malformed,
    #[error("unsupported zip feature (zip64 or multi-disk)")]
    Unsupported,
}

/// Central-directory metadata for one entry. No payload bytes are touched.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewEntry {
    pub name: String,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    pub encrypted: bool,
    pub is_dir: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchivePreview {
    pub entries: Vec<PreviewEntry>,
    /// Full entry count from the EOCD, even when `entries` is capped.
    pub total_entries: usize,
    pub truncated: bool,
}

/// List up to `max_entries` central-directory entries of a ZIP buffer.
pub fn preview(buf: &[u8], max_entries: usize) -> Result<ArchivePreview, PreviewError> {
    if buf.len() < EOCD_MIN_LEN {
        return Err(PreviewError::NoEocd);
    }

    // Scan the trailing window backward for the EOCD signature.
    let win_start = buf.len().saturating_sub(EOCD_SEARCH_MAX);
    let win = &buf[win_start..];
    let eocd_rel = rfind_sig(win, SIG_EOCD).ok_or(PreviewError::NoEocd)?;
    let eocd = &win[eocd_rel..];
    if eocd.len() < EOCD_MIN_LEN {
        return Err(PreviewError::Malformed);
    }

    let disk_no = le_u16(&eocd[4..6]);
    let cd_disk = le_u16(&eocd[6..8]);
    let entries_total = le_u16(&eocd[10..12]);
    let cd_size = le_u32(&eocd[12..16]);
    let cd_off = le_u32(&eocd[16..20]);

    if disk_no != 0 || cd_disk != 0 {
        return Err(PreviewError::Unsupported);
    }
    if entries_total == SENTINEL_U16 || cd_size == SENTINEL_U32 || cd_off == SENTINEL_U32 {
        return Err(PreviewError::Unsupported);
    }

    let entries_total = entries_total as usize;
    let cd_off = cd_off as usize;
    let cd_end = cd_off
        .checked_add(cd_size as usize)
        .ok_or(PreviewError::Malformed)?;
    if cd_end > buf.len() {
        return Err(PreviewError::Malformed);
    }

    let mut entries = Vec::with_capacity(entries_total.min(max_entries));
    let mut pos = cd_off;
    for _ in 0..entries_total {
        let rec_end = pos.checked_add(CDFH_LEN).ok_or(PreviewError::Malformed)?;
        if rec_end > cd_end {
            return Err(PreviewError::Malformed);
        }
        let rec = &buf[pos..rec_end];
        if le_u32(&rec[0..4]) != SIG_CDFH {
            return Err(PreviewError::Malformed);
        }
        let flags = le_u16(&rec[8..10]);
        let crc32 = le_u32(&rec[16..20]);
        let compressed = le_u32(&rec[20..24]);
        let uncompressed = le_u32(&rec[24..28]);
        let name_len = le_u16(&rec[28..30]) as usize;
        let extra_len = le_u16(&rec[30..32]) as usize;
        let comment_len = le_u16(&rec[32..34]) as usize;

        if compressed == SENTINEL_U32 || uncompressed == SENTINEL_U32 {
            return Err(PreviewError::Unsupported);
        }

        let name_end = rec_end
            .checked_add(name_len)
            .ok_or(PreviewError::Malformed)?;
        if name_end > cd_end {
            return Err(PreviewError::Malformed);
        }
        if entries.len() < max_entries {
            let name = String::from_utf8_lossy(&buf[rec_end..name_end]).into_owned();
            entries.push(PreviewEntry {
                is_dir: name.ends_with('/'),
                name,
                compressed_size: compressed as u64,
                uncompressed_size: uncompressed as u64,
                crc32,
                encrypted: flags & 0x0001 != 0,
            });
        }
        pos = name_end
            .checked_add(extra_len)
            .and_then(|p| p.checked_add(comment_len))
            .ok_or(PreviewError::Malformed)?;
    }

    Ok(ArchivePreview {
        truncated: entries.len() < entries_total,
        total_entries: entries_total,
        entries,
    })
}

fn rfind_sig(win: &[u8], sig: u32) -> Option<usize> {
    let needle = sig.to_le_bytes();
    (0..=win.len().checked_sub(4)?).rev().find(|&i| win[i..i + 4] == needle)
}

fn le_u16(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}
