//! Container format detection

use crate::error::{CoreError, Result};

/// Storage format of an AnnData container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FileFormat {
    /// Single-file hierarchical store
    H5ad,
    /// Directory-based chunked store
    Zarr,
}

impl FileFormat {
    pub const H5AD_SUFFIX: &'static str = ".h5ad";
    pub const ZARR_SUFFIX: &'static str = ".zarr";

    /// Select the format from a path's textual suffix
    ///
    /// A directory store may be written with a trailing separator.
    /// Matching is case-sensitive.
    pub fn from_path_str(path: &str) -> Result<Self> {
        let trimmed = path.strip_suffix('/').unwrap_or(path);
        if trimmed.ends_with(Self::ZARR_SUFFIX) {
            Ok(FileFormat::Zarr)
        } else if path.ends_with(Self::H5AD_SUFFIX) {
            Ok(FileFormat::H5ad)
        } else {
            Err(CoreError::UnknownFormat)
        }
    }

    /// Whether an open handle holds a resource that must be released
    pub const fn requires_explicit_close(&self) -> bool {
        matches!(self, FileFormat::H5ad)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            FileFormat::H5ad => "h5ad",
            FileFormat::Zarr => "zarr",
        }
    }

    pub const fn suffix(&self) -> &'static str {
        match self {
            FileFormat::H5ad => Self::H5AD_SUFFIX,
            FileFormat::Zarr => Self::ZARR_SUFFIX,
        }
    }
}

impl core::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
