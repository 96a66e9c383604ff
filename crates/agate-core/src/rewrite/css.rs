//! CSS `url(...)` reference rewriting.
//!
//! Handles quoted and unquoted forms, preserving the original quote style.
//! The mapper decides per reference: `None` leaves the match untouched
//! (absolute URLs, special schemes).

use regex::Regex;
use std::sync::OnceLock;

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^'"\s)][^)]*?))\s*\)"#)
            .expect("url() pattern")
    })
}

/// Rewrite every `url(...)` occurrence through `map`.
pub fn rewrite_css_urls(css: &str, map: &dyn Fn(&str) -> Option<String>) -> String {
    url_re()
        .replace_all(css, |caps: &regex::Captures<'_>| {
            let (value, quote) = if let Some(m) = caps.get(1) {
                (m.as_str(), "\"")
            } else if let Some(m) = caps.get(2) {
                (m.as_str(), "'")
            } else if let Some(m) = caps.get(3) {
                (m.as_str(), "")
            } else {
                return caps[0].to_string();
            };
            match map(value.trim()) {
                Some(rewritten) => format!("url({quote}{rewritten}{quote})"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
