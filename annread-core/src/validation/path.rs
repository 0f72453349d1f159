//! In-container path normalisation
//!
//! Paths are slash separated and relative to the container root. Leading
//! and trailing separators are ignored, so `"/obsm/X_pca/"` and
//! `"obsm/X_pca"` name the same element.

use crate::CoreError;

/// Strip outer separators and reject malformed paths
///
/// Empty paths, empty segments (`"a//b"`) and relative segments
/// (`"."`, `".."`) are rejected.
pub fn normalize_slot_path(path: &str) -> Result<&str, CoreError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(CoreError::InvalidSlotPath);
    }
    let malformed = trimmed
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if malformed {
        return Err(CoreError::InvalidSlotPath);
    }
    Ok(trimmed)
}

/// Split a normalised path into its parent and last segment
pub fn split_parent(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once('/') {
        Some((parent, name)) => (Some(parent), name),
        None => (None, path),
    }
}
