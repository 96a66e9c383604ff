//! Relative-path normalization for index keys and reference resolution.

/// Normalize an archive-recorded path: backslashes become `/`, repeated
/// separators collapse, `.` segments and edge slashes are dropped. `..`
/// segments are kept verbatim; callers decide what an escape means.
pub fn normalize(path: &str) -> String {
    let replaced = path.replace('\\', "/");
    let parts: Vec<&str> = replaced
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect();
    parts.join("/")
}

/// Join `reference` against the directory of `html_path`, resolving `.` and
/// `..` lexically. Returns `None` when the reference would climb above the
/// root of the file set (the traversal guard); callers fall through to
/// other lookups rather than erroring.
pub fn join_relative(html_path: &str, reference: &str) -> Option<String> {
    let html_norm = normalize(html_path);
    let mut stack: Vec<&str> = html_norm.split('/').filter(|s| !s.is_empty()).collect();
    // Drop the HTML file itself; what remains is its directory.
    stack.pop();

    let ref_replaced = reference.replace('\\', "/");
    for seg in ref_replaced.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if stack.pop().is_none() {
                    return None;
                }
            }
            other => stack.push(other),
        }
    }
    Some(stack.join("/"))
}

/// Final path segment.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_separators() {
        assert_eq!(normalize("a\\b\\c.png"), "a/b/c.png");
        assert_eq!(normalize("//a///b/"), "a/b");
        assert_eq!(normalize("./img/./logo.png"), "img/logo.png");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn join_within_tree() {
        assert_eq!(
            join_relative("index.html", "img/logo.png").as_deref(),
            Some("img/logo.png")
        );
        assert_eq!(
            join_relative("pages/about.html", "style.css").as_deref(),
            Some("pages/style.css")
        );
        assert_eq!(
            join_relative("pages/about.html", "../img/logo.png").as_deref(),
            Some("img/logo.png")
        );
    }

    #[test]
    fn join_refuses_escape() {
        assert_eq!(join_relative("index.html", "../outside.png"), None);
        assert_eq!(join_relative("a/b.html", "../../../etc/passwd"), None);
    }

    #[test]
    fn basename_last_segment() {
        assert_eq!(basename("img/logo.png"), "logo.png");
        assert_eq!(basename("logo.png"), "logo.png");
    }
}
