//! Shared helpers for integration tests: a fake clamd daemon and in-memory
//! test archive builders.

pub mod clamd_server;

use std::io::Write;
use zip::unstable::write::FileOptionsExt;
use zip::write::SimpleFileOptions;

/// PNG magic followed by filler, enough for content sniffing.
pub const PNG_STUB: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d,
];

/// Build a ZIP from (name, body) pairs. Names ending in `/` become
/// directory entries.
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default();
    for (name, body) in entries {
        if name.ends_with('/') {
            writer.add_directory(name.trim_end_matches('/'), opts).unwrap();
        } else {
            writer.start_file(*name, opts).unwrap();
            writer.write_all(body).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Rename an entry in a finished ZIP in place (local header and central
/// directory both carry the name; CRCs cover payloads only). Lengths must
/// match. Lets tests plant names a well-behaved writer refuses, e.g. `..`.
pub fn rename_entry(zip: &mut [u8], from: &str, to: &str) {
    assert_eq!(from.len(), to.len(), "rename must preserve length");
    let from = from.as_bytes();
    let to = to.as_bytes();
    let mut i = 0;
    while i + from.len() <= zip.len() {
        if &zip[i..i + from.len()] == from {
            zip[i..i + from.len()].copy_from_slice(to);
            i += from.len();
        } else {
            i += 1;
        }
    }
}

/// Build a ZIP whose entries are ZipCrypto-encrypted with `password`.
pub fn build_zip_encrypted(entries: &[(&str, &[u8])], password: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default().with_deprecated_encryption(password.as_bytes());
    for (name, body) in entries {
        writer.start_file(*name, opts).unwrap();
        writer.write_all(body).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
