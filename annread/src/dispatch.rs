//! Format dispatch
//!
//! Existence is checked before the suffix, so a missing path with an
//! unrecognised suffix reports the missing path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use annread_core::FileFormat;
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::Container;

/// Freshly opened container together with its detected format
#[derive(Debug, Clone)]
pub struct OpenedContainer {
    pub container: Arc<dyn Container>,
    pub format: FileFormat,
}

/// Open the container at `path` with the backend its suffix selects
pub fn open_container<P: AsRef<Path>>(path: P) -> Result<OpenedContainer> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let format = FileFormat::from_path_str(&path.to_string_lossy())
        .map_err(|_| Error::UnknownFormat(path.to_path_buf()))?;

    let container = match format {
        FileFormat::Zarr => open_zarr(path)?,
        FileFormat::H5ad => open_h5ad(path)?,
    };
    debug!(path = %path.display(), %format, "opened container");
    Ok(OpenedContainer { container, format })
}

#[cfg(feature = "zarr")]
fn open_zarr(path: &Path) -> Result<Arc<dyn Container>> {
    Ok(Arc::new(crate::store::ZarrStore::open(path)?))
}

#[cfg(not(feature = "zarr"))]
fn open_zarr(_path: &Path) -> Result<Arc<dyn Container>> {
    Err(Error::BackendUnavailable(FileFormat::Zarr))
}

#[cfg(feature = "h5ad")]
fn open_h5ad(path: &Path) -> Result<Arc<dyn Container>> {
    Ok(Arc::new(crate::store::H5adStore::open(path)?))
}

#[cfg(not(feature = "h5ad"))]
fn open_h5ad(_path: &Path) -> Result<Arc<dyn Container>> {
    Err(Error::BackendUnavailable(FileFormat::H5ad))
}

/// Location of a named single-file dataset inside a data directory
pub fn dataset_path<P: AsRef<Path>>(data_dir: P, dataset_name: &str) -> PathBuf {
    data_dir
        .as_ref()
        .join(format!("{dataset_name}{}", FileFormat::H5AD_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("x.unknownext");
        assert!(matches!(
            open_container(&missing),
            Err(Error::FileNotFound(p)) if p == missing
        ));
    }

    #[test]
    fn test_unknown_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.unknownext");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(open_container(&path), Err(Error::UnknownFormat(_))));
    }

    #[cfg(not(feature = "h5ad"))]
    #[test]
    fn test_backend_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pbmc.h5ad");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(
            open_container(&path),
            Err(Error::BackendUnavailable(FileFormat::H5ad))
        ));
    }

    #[test]
    fn test_dataset_path() {
        assert_eq!(
            dataset_path("/data", "pbmc3k"),
            PathBuf::from("/data/pbmc3k.h5ad")
        );
    }
}
