//! Content-type detection from magic bytes.
//!
//! Classifies a buffer's true type from its content. The caller's filename
//! is consulted only for the single HTML tiebreak documented on [`detect`];
//! extensions and caller-supplied MIME claims are otherwise ignored. MIME
//! allowlisting downstream is only as strong as this module's refusal to be
//! fooled by a renamed file.

/// MIME strings returned by [`detect`].
pub const MIME_PNG: &str = "image/png";
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_GIF: &str = "image/gif";
pub const MIME_WEBP: &str = "image/webp";
pub const MIME_SVG: &str = "image/svg+xml";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_ZIP: &str = "application/zip";
pub const MIME_HTML: &str = "text/html";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

/// Detection result: the sniffed MIME type and a canonical extension, when
/// the format has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detected {
    pub mime: &'static str,
    pub ext: Option<&'static str>,
}

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
const JPEG_MAGIC: [u8; 3] = [0xff, 0xd8, 0xff];
const UTF8_BOM: [u8; 3] = [0xef, 0xbb, 0xbf];

/// Window scanned for an `<svg` root after an XML prolog.
const SVG_SCAN_MAX: usize = 4096;

/// Detect the content type of a buffer.
///
/// Magic bytes are checked first (PNG, JPEG, GIF, WEBP, PDF, ZIP). Textual
/// formats (SVG, HTML) are sniffed from the leading bytes after trimming
/// whitespace and a UTF-8 BOM, ASCII case-insensitively. `original_name` is
/// used in exactly one case: content that is printable text opening with `<`
/// but matching no specific pattern is classified as HTML when the name ends
/// in `.html`/`.htm`. Everything else falls back to `text/plain` (printable
/// UTF-8) or `application/octet-stream`.
pub fn detect(buf: &[u8], original_name: Option<&str>) -> Detected {
    if buf.starts_with(&PNG_MAGIC) {
        return Detected { mime: MIME_PNG, ext: Some("png") };
    }
    if buf.starts_with(&JPEG_MAGIC) {
        return Detected { mime: MIME_JPEG, ext: Some("jpg") };
    }
    if buf.starts_with(b"GIF87a") || buf.starts_with(b"GIF89a") {
        return Detected { mime: MIME_GIF, ext: Some("gif") };
    }
    if is_webp(buf) {
        return Detected { mime: MIME_WEBP, ext: Some("webp") };
    }
    if buf.starts_with(b"%PDF") {
        return Detected { mime: MIME_PDF, ext: Some("pdf") };
    }
    if is_zip_magic(buf) {
        return Detected { mime: MIME_ZIP, ext: Some("zip") };
    }

    let text = trim_leading(buf);
    if starts_with_ignore_ascii_case(text, b"<svg") {
        return Detected { mime: MIME_SVG, ext: Some("svg") };
    }
    if starts_with_ignore_ascii_case(text, b"<?xml") && contains_svg_root(text) {
        return Detected { mime: MIME_SVG, ext: Some("svg") };
    }
    if looks_like_html(text) {
        return Detected { mime: MIME_HTML, ext: Some("html") };
    }

    let printable = is_printable_text(buf);

    // The documented tiebreak: generic leading markup plus an .html name.
    if printable && text.first() == Some(&b'<') {
        if let Some(name) = original_name {
            let lower = name.to_ascii_lowercase();
            if lower.ends_with(".html") || lower.ends_with(".htm") {
                return Detected { mime: MIME_HTML, ext: Some("html") };
            }
        }
    }

    if printable && !buf.is_empty() {
        return Detected { mime: MIME_TEXT, ext: Some("txt") };
    }
    Detected { mime: MIME_OCTET_STREAM, ext: None }
}

/// ZIP signatures are `PK` followed by one of the known marker pairs:
/// local file header (03 04), end of central directory (05 06), or
/// data descriptor / spanned marker (07 08).
pub fn is_zip_magic(buf: &[u8]) -> bool {
    if buf.len() < 4 || buf[0] != b'P' || buf[1] != b'K' {
        return false;
    }
    matches!((buf[2], buf[3]), (3, 4) | (5, 6) | (7, 8))
}

fn is_webp(buf: &[u8]) -> bool {
    buf.len() >= 12 && &buf[0..4] == b"RIFF" && &buf[8..12] == b"WEBP"
}

fn trim_leading(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_prefix(&UTF8_BOM).unwrap_or(buf);
    let start = buf
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(buf.len());
    &buf[start..]
}

fn starts_with_ignore_ascii_case(hay: &[u8], prefix: &[u8]) -> bool {
    hay.len() >= prefix.len() && hay[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// After an XML prolog, look for an `<svg` root within a bounded window.
fn contains_svg_root(text: &[u8]) -> bool {
    let window = &text[..text.len().min(SVG_SCAN_MAX)];
    window
        .windows(4)
        .any(|w| w.eq_ignore_ascii_case(b"<svg"))
}

fn looks_like_html(text: &[u8]) -> bool {
    const OPENERS: &[&[u8]] = &[b"<!doctype html", b"<html", b"<head", b"<body"];
    OPENERS
        .iter()
        .any(|p| starts_with_ignore_ascii_case(text, p))
}

/// Printable text: valid UTF-8 with no control characters beyond
/// tab/newline/carriage-return.
fn is_printable_text(buf: &[u8]) -> bool {
    match std::str::from_utf8(buf) {
        Ok(s) => !s
            .chars()
            .any(|c| c.is_control() && c != '\t' && c != '\n' && c != '\r'),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_bytes_win() {
        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0];
        assert_eq!(detect(&png, None).mime, MIME_PNG);
        assert_eq!(detect(&[0xff, 0xd8, 0xff, 0xe0], None).mime, MIME_JPEG);
        assert_eq!(detect(b"GIF89a....", None).mime, MIME_GIF);
        assert_eq!(detect(b"%PDF-1.7 ...", None).mime, MIME_PDF);
        assert_eq!(detect(b"RIFF\x00\x00\x00\x00WEBPVP8 ", None).mime, MIME_WEBP);
        assert_eq!(detect(b"PK\x03\x04rest", None).mime, MIME_ZIP);
        assert_eq!(detect(b"PK\x05\x06rest", None).mime, MIME_ZIP);
    }

    #[test]
    fn renamed_html_is_still_html() {
        // Scenario: bytes are HTML, name claims PNG. The name must not win.
        let d = detect(b"<!DOCTYPE html><html><body>hi</body></html>", Some("photo.png"));
        assert_eq!(d.mime, MIME_HTML);
    }

    #[test]
    fn filename_never_upgrades_binary() {
        let d = detect(&[0x00, 0x01, 0x02, 0x03], Some("page.html"));
        assert_eq!(d.mime, MIME_OCTET_STREAM);
    }

    #[test]
    fn html_sniffed_after_leading_whitespace_case_insensitive() {
        assert_eq!(detect(b"\n\t  <HTML><body>", None).mime, MIME_HTML);
        assert_eq!(detect(b"  <!doctype HTML>", None).mime, MIME_HTML);
    }

    #[test]
    fn svg_with_and_without_prolog() {
        assert_eq!(detect(b"<svg xmlns=\"...\">", None).mime, MIME_SVG);
        assert_eq!(
            detect(b"<?xml version=\"1.0\"?>\n<svg width=\"1\">", None).mime,
            MIME_SVG
        );
        // XML that never reaches an svg root is not SVG.
        assert_ne!(detect(b"<?xml version=\"1.0\"?><feed/>", None).mime, MIME_SVG);
    }

    #[test]
    fn html_tiebreak_requires_both_markup_and_name() {
        // Generic markup, no name: not HTML.
        let d = detect(b"<section>stuff</section>", None);
        assert_eq!(d.mime, MIME_TEXT);
        // Same bytes with an .html name: the documented tiebreak.
        let d = detect(b"<section>stuff</section>", Some("page.html"));
        assert_eq!(d.mime, MIME_HTML);
        // Non-html name does not trigger it.
        let d = detect(b"<section>stuff</section>", Some("page.xml"));
        assert_eq!(d.mime, MIME_TEXT);
    }

    #[test]
    fn printable_and_binary_fallbacks() {
        assert_eq!(detect(b"plain words here", None).mime, MIME_TEXT);
        assert_eq!(detect(&[0xc0, 0xff, 0x00], None).mime, MIME_OCTET_STREAM);
        assert_eq!(detect(b"", None).mime, MIME_OCTET_STREAM);
    }

    #[test]
    fn bom_is_stripped_before_textual_sniff() {
        let mut buf = vec![0xef, 0xbb, 0xbf];
        buf.extend_from_slice(b"<html><body>x</body></html>");
        assert_eq!(detect(&buf, None).mime, MIME_HTML);
    }
}
