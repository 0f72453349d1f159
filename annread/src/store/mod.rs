//! Storage backends
//!
//! A [`Container`] is an open, hierarchical store: groups hold named
//! children, arrays hold typed data, and both carry JSON-like attributes.
//! Paths are slash separated and relative to the root; the empty path is
//! the root itself.

use std::fmt;
use std::ops::Range;
use std::path::Path;

use annread_core::{DataType, FileFormat};

use crate::error::Result;
use crate::value::ArrayData;

#[cfg(feature = "h5ad")]
pub mod h5ad;
#[cfg(feature = "zarr")]
pub mod zarr;

#[cfg(feature = "h5ad")]
pub use h5ad::H5adStore;
#[cfg(feature = "zarr")]
pub use zarr::ZarrStore;

/// Attributes attached to a node
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Kind of a node in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Array,
}

/// Shape and element type of a stored array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayInfo {
    pub shape: Vec<usize>,
    pub dtype: DataType,
}

impl ArrayInfo {
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An open AnnData container
///
/// Implementations are shared behind an `Arc` by backed handles, so all
/// methods take `&self`. After [`Container::close`] every read fails with
/// [`crate::Error::ContainerClosed`].
pub trait Container: Send + Sync + fmt::Debug {
    fn format(&self) -> FileFormat;

    /// Filesystem location the container was opened from
    fn location(&self) -> &Path;

    /// Whether a node exists at `path`
    fn contains(&self, path: &str) -> Result<bool>;

    /// Names of the direct children of a group, sorted
    ///
    /// Arrays have no children.
    fn children(&self, path: &str) -> Result<Vec<String>>;

    fn node_kind(&self, path: &str) -> Result<NodeKind>;

    fn attributes(&self, path: &str) -> Result<Attributes>;

    fn array_info(&self, path: &str) -> Result<ArrayInfo>;

    /// Whole array, flattened in row-major order
    fn read_array(&self, path: &str) -> Result<ArrayData>;

    /// Contiguous range of a one-dimensional array
    fn read_array_range(&self, path: &str, range: Range<usize>) -> Result<ArrayData>;

    fn is_open(&self) -> bool;

    /// Release the underlying resource; later calls are no-ops
    fn close(&self) -> Result<()>;

    /// Number of top-level children
    fn len(&self) -> Result<usize> {
        Ok(self.children("")?.len())
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Join a parent path and a child name
pub fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}/{child}")
    }
}

/// Read an attribute as a string, if present and textual
pub fn attr_str<'a>(attrs: &'a Attributes, key: &str) -> Option<&'a str> {
    attrs.get(key).and_then(|v| v.as_str())
}

/// Read an attribute as a list of strings
///
/// A single string is a one-element list.
pub fn attr_strings(attrs: &Attributes, key: &str) -> Option<Vec<String>> {
    match attrs.get(key)? {
        serde_json::Value::String(s) => Some(vec![s.clone()]),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

/// Read an attribute as a list of non-negative integers
pub fn attr_usizes(attrs: &Attributes, key: &str) -> Option<Vec<usize>> {
    match attrs.get(key)? {
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| item.as_u64().and_then(|n| usize::try_from(n).ok()))
            .collect(),
        _ => None,
    }
}

/// Read an attribute as a flag; numbers are true when non-zero
pub fn attr_bool(attrs: &Attributes, key: &str) -> Option<bool> {
    match attrs.get(key)? {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        _ => None,
    }
}
