//! Storage-safe asset name sanitization.

/// Sanitizes an asset name for use inside the store.
///
/// - Replaces every character outside `[A-Za-z0-9._-]` with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing dots and underscores (so `.`/`..` cannot survive)
/// - Limits length to 255 bytes (Linux NAME_MAX)
/// - Falls back to `asset` when nothing survives
pub fn sanitize_asset_name(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let keep = c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-';
        let replacement = if keep { c } else { '_' };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        return "asset".to_string();
    }
    let mut result = trimmed.to_string();
    result.truncate(NAME_MAX);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_separators_and_specials() {
        assert_eq!(sanitize_asset_name("a/b\\c.png"), "a_b_c.png");
        assert_eq!(sanitize_asset_name("logo (final).png"), "logo_final_.png");
    }

    #[test]
    fn well_formed_names_pass_through() {
        assert_eq!(sanitize_asset_name("logo.png"), "logo.png");
        assert_eq!(sanitize_asset_name("style-v2.min.css"), "style-v2.min.css");
    }

    #[test]
    fn dot_names_cannot_survive() {
        assert_eq!(sanitize_asset_name("."), "asset");
        assert_eq!(sanitize_asset_name(".."), "asset");
        assert_eq!(sanitize_asset_name("..hidden"), "hidden");
    }

    #[test]
    fn collapses_underscores() {
        assert_eq!(sanitize_asset_name("a   b.txt"), "a_b.txt");
        assert_eq!(sanitize_asset_name("a___b.txt"), "a_b.txt");
    }

    #[test]
    fn non_ascii_replaced() {
        assert_eq!(sanitize_asset_name("bannière.jpg"), "banni_re.jpg");
    }

    #[test]
    fn empty_input_falls_back() {
        assert_eq!(sanitize_asset_name(""), "asset");
        assert_eq!(sanitize_asset_name("///"), "asset");
    }

    #[test]
    fn output_charset_invariant() {
        for name in ["weird name!@#$.png", "päth/to/fïle", "\0\0"] {
            let s = sanitize_asset_name(name);
            assert!(
                s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-'),
                "unsafe char survived in {s:?}"
            );
        }
    }
}
