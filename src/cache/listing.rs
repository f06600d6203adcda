//! Listing Module
//!
//! Prefix/delimiter name matching shared by the cache's query engine and
//! storage backends, so that both sides agree on displayed names.

// == Display Name ==
/// Computes the name a hierarchical listing shows for `object_name`.
///
/// Returns None when the name does not start with `prefix`. With a non-empty
/// `delimiter`, the name is cut right after the first delimiter that follows
/// the prefix, which turns `"foo/dir6/bar"` (prefix `"foo/dir"`, delimiter
/// `"/"`) into the implicit directory `"foo/dir6/"`. Names without a later
/// delimiter, or whose only later delimiter is the trailing one, come back
/// unchanged.
pub fn display_name<'a>(
    object_name: &'a str,
    prefix: &str,
    delimiter: Option<&str>,
) -> Option<&'a str> {
    let rest = object_name.strip_prefix(prefix)?;

    match delimiter.filter(|d| !d.is_empty()) {
        Some(delimiter) => match rest.find(delimiter) {
            Some(index) => Some(&object_name[..prefix.len() + index + delimiter.len()]),
            None => Some(object_name),
        },
        None => Some(object_name),
    }
}

/// True if `display` is a directory synthesized from a deeper name rather
/// than `object_name` itself.
pub fn is_implicit(object_name: &str, display: &str) -> bool {
    display.len() < object_name.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_mismatch() {
        assert_eq!(display_name("bar/dir1", "foo/", Some("/")), None);
    }

    #[test]
    fn test_no_delimiter_returns_full_name() {
        assert_eq!(display_name("foo/dir6/bar", "foo/", None), Some("foo/dir6/bar"));
        assert_eq!(
            display_name("foo/dir6/bar", "foo/", Some("")),
            Some("foo/dir6/bar")
        );
    }

    #[test]
    fn test_implicit_directory() {
        assert_eq!(
            display_name("foo/dir6/bar", "foo/dir", Some("/")),
            Some("foo/dir6/")
        );
        assert!(is_implicit("foo/dir6/bar", "foo/dir6/"));
    }

    #[test]
    fn test_trailing_delimiter_is_kept_verbatim() {
        assert_eq!(display_name("foo/dir4/", "foo/dir", Some("/")), Some("foo/dir4/"));
        assert!(!is_implicit("foo/dir4/", "foo/dir4/"));
    }

    #[test]
    fn test_name_without_later_delimiter() {
        assert_eq!(display_name("foo/dir3", "foo/dir", Some("/")), Some("foo/dir3"));
    }

    #[test]
    fn test_delimiter_inside_prefix_is_ignored() {
        assert_eq!(display_name("a/b/c", "a/", Some("/")), Some("a/b/"));
        assert_eq!(display_name("a/b", "a/", Some("/")), Some("a/b"));
    }

    #[test]
    fn test_multichar_delimiter() {
        assert_eq!(display_name("x--y--z", "x", Some("--")), Some("x--"));
        assert_eq!(display_name("xa--y--z", "x", Some("--")), Some("xa--"));
    }

    #[test]
    fn test_empty_prefix() {
        assert_eq!(display_name("a/b", "", Some("/")), Some("a/"));
        assert_eq!(display_name("a", "", Some("/")), Some("a"));
    }
}
