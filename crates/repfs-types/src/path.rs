//! Path splitting helpers for the forward-slash namespace.
//!
//! Paths are absolute; the empty string and `"/"` both denote the root, and
//! the empty string is the canonical spelling.

/// Everything up to (but excluding) the last `/`.
///
/// `dir_part("/a/b") == "/a"`, `dir_part("/a") == ""` (the root). A path
/// without a slash has an empty dir part.
pub fn dir_part(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Everything after the last `/`.
///
/// `name_part("/a/b") == "b"`. A path without a slash is its own name.
pub fn name_part(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Split a path into its non-empty components.
///
/// Both root spellings (`""` and `"/"`) yield no segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Whether the path denotes the root.
pub fn is_root(path: &str) -> bool {
    segments(path).next().is_none()
}
