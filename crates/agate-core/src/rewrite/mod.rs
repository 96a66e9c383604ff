//! HTML asset-reference rewriting.
//!
//! Rewrites relative `src`/`href` attributes and CSS `url(...)` references
//! (inline `style` attributes and `<style>` blocks) to absolute serving
//! URLs. Absolute URLs, special schemes (`data:`, `blob:`, `mailto:`,
//! `tel:`, `javascript:`), protocol-relative and fragment-only references
//! pass through untouched, which is what keeps repeated rewrites with the
//! same base idempotent. No network or disk access.

pub mod css;

use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, text, RewriteStrSettings};
use thiserror::Error;

use crate::resolve::{self, AssetIndex};

/// The public prefix under which stored assets are served. Transient per
/// rewrite call.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    pub base_url: String,
}

impl RewriteContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("html rewriting failed: {0}")]
    Html(String),
}

/// Rewrite relative references by joining them against the base URL.
pub fn rewrite(html: &str, ctx: &RewriteContext) -> Result<String, RewriteError> {
    rewrite_with(html, ctx, None)
}

/// Pipeline form: resolve each relative reference through the upload's
/// asset index first. A hit maps to the store's public scheme
/// (`{base}/{id}/{sanitized_name}`); a miss falls back to the plain join.
pub fn rewrite_resolved(
    html: &str,
    ctx: &RewriteContext,
    index: &AssetIndex,
    html_path: &str,
) -> Result<String, RewriteError> {
    rewrite_with(html, ctx, Some((index, html_path)))
}

fn rewrite_with(
    html: &str,
    ctx: &RewriteContext,
    resolver: Option<(&AssetIndex, &str)>,
) -> Result<String, RewriteError> {
    let base = ctx.base_url.as_str();
    let mut style_buf = String::new();

    let handlers = vec![
        element!("*[src]", move |el| rewrite_attr(el, "src", base, resolver)),
        element!("a[href]", move |el| rewrite_attr(el, "href", base, resolver)),
        element!("link[href]", move |el| rewrite_attr(el, "href", base, resolver)),
        element!("area[href]", move |el| rewrite_attr(el, "href", base, resolver)),
        element!("*[style]", move |el| {
            if let Some(value) = el.get_attribute("style") {
                let rewritten =
                    css::rewrite_css_urls(&value, &|r| map_ref(r, base, resolver));
                if rewritten != value {
                    el.set_attribute("style", &rewritten)?;
                }
            }
            Ok(())
        }),
        // <style> text arrives in chunks; buffer until the last one so
        // url() references split across chunks are still seen whole.
        text!("style", move |chunk| {
            style_buf.push_str(chunk.as_str());
            if chunk.last_in_text_node() {
                let rewritten =
                    css::rewrite_css_urls(&style_buf, &|r| map_ref(r, base, resolver));
                chunk.replace(&rewritten, ContentType::Html);
                style_buf.clear();
            } else {
                chunk.remove();
            }
            Ok(())
        }),
    ];

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| RewriteError::Html(e.to_string()))
}

fn rewrite_attr(
    el: &mut lol_html::html_content::Element,
    attr: &str,
    base: &str,
    resolver: Option<(&AssetIndex, &str)>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if let Some(value) = el.get_attribute(attr) {
        if let Some(abs) = map_ref(&value, base, resolver) {
            el.set_attribute(attr, &abs)?;
        }
    }
    Ok(())
}

/// Decide the replacement for one reference. `None` means "leave it alone".
fn map_ref(
    reference: &str,
    base: &str,
    resolver: Option<(&AssetIndex, &str)>,
) -> Option<String> {
    if resolve::is_external_ref(reference) {
        return None;
    }
    // Already under the serving prefix: never re-join (idempotence).
    let base_trimmed = base.trim_end_matches('/');
    if !base_trimmed.is_empty() && reference.starts_with(&format!("{base_trimmed}/")) {
        return None;
    }
    if let Some((index, html_path)) = resolver {
        if let Some(asset) = index.resolve(html_path, reference) {
            return Some(asset.public_path(base));
        }
    }
    Some(join_base(base, reference))
}

fn join_base(base: &str, reference: &str) -> String {
    let base_dir = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };
    if let Ok(parsed) = url::Url::parse(&base_dir) {
        if let Ok(joined) = parsed.join(reference.trim_start_matches('/')) {
            return joined.to_string();
        }
    }
    // Path-only base (e.g. "/uploads"): plain string join.
    let cleaned = reference.trim_start_matches("./").trim_start_matches('/');
    format!("{}/{}", base.trim_end_matches('/'), cleaned)
}
