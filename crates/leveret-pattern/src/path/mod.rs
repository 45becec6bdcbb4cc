/// Path utilities shared by the pattern compiler and the request matcher
///
/// All functions are **pure**: given same input, always produce same output with no side effects.

use std::borrow::Cow;

/// Checks whether a request path is already in matching form
///
/// # Rules
///
/// - Must not be empty
/// - Must not end with `/` (except root `/`)
///
/// # Examples
///
/// ```
/// use leveret_pattern::path::is_normalized;
///
/// assert!(is_normalized("/"));
/// assert!(is_normalized("/users/123"));
///
/// assert!(!is_normalized(""));
/// assert!(!is_normalized("/users/"));
/// ```
pub fn is_normalized(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }

    path == "/" || !path.ends_with('/')
}

/// Normalizes a request path for matching
///
/// Returns `Cow::Borrowed` when the path is already normalized.
///
/// - Trailing slashes are stripped: `/hello/` → `/hello`
/// - Root is preserved: `/` → `/`
/// - An empty path (or one made only of slashes) becomes the root
///
/// # Examples
///
/// ```
/// use leveret_pattern::path::normalize_path;
/// use std::borrow::Cow;
///
/// assert!(matches!(normalize_path("/about"), Cow::Borrowed("/about")));
/// assert_eq!(normalize_path("/about//"), "/about");
/// assert_eq!(normalize_path(""), "/");
/// assert_eq!(normalize_path("///"), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_normalized(path) {
        return Cow::Borrowed(path);
    }

    match path.trim_end_matches('/') {
        "" => Cow::Owned("/".to_string()),
        trimmed => Cow::Borrowed(trimmed),
    }
}

/// Normalizes a route template before compilation
///
/// Unlike [`normalize_path`], an empty template stays empty: it compiles to the
/// same root matcher as `/` but keeps its raw form.
///
/// ```
/// use leveret_pattern::path::normalize_pattern;
///
/// assert_eq!(normalize_pattern("/"), "/");
/// assert_eq!(normalize_pattern("/users/:id/"), "/users/:id");
/// assert_eq!(normalize_pattern(""), "");
/// ```
pub fn normalize_pattern(pattern: &str) -> &str {
    if pattern == "/" {
        pattern
    } else {
        pattern.trim_end_matches('/')
    }
}
