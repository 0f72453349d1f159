//! Directory-store backend on top of `zarrs`
//!
//! Nodes are directories carrying `zarr.json` (v3) or `.zarray`/`.zgroup`
//! (v2) metadata. Child listing walks the filesystem directly; metadata and
//! chunk reads go through the `zarrs` storage layer.

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use annread_core::{DataType, FileFormat};
use tracing::debug;
use zarrs::array::{Array, DataType as ZarrDataType};
use zarrs::array_subset::ArraySubset;
use zarrs::filesystem::FilesystemStore;
use zarrs::group::Group;
use zarrs::storage::{ReadableWritableListableStorage, ReadableWritableListableStorageTraits};

use super::{ArrayInfo, Attributes, Container, NodeKind};
use crate::error::{Error, Result};
use crate::value::ArrayData;

type ZarrArray = Array<dyn ReadableWritableListableStorageTraits>;

const METADATA_FILES: [&str; 3] = ["zarr.json", ".zarray", ".zgroup"];

/// Open directory store
pub struct ZarrStore {
    root: PathBuf,
    storage: ReadableWritableListableStorage,
    open: AtomicBool,
}

impl ZarrStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::store("", "directory store root is not a directory"));
        }
        let storage: ReadableWritableListableStorage =
            Arc::new(FilesystemStore::new(&root).map_err(|e| Error::store("", e))?);
        debug!(path = %root.display(), "opened directory store");
        Ok(ZarrStore {
            root,
            storage,
            open: AtomicBool::new(true),
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(Error::ContainerClosed)
        }
    }

    fn node_dir(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |dir, segment| dir.join(segment))
    }

    fn key(path: &str) -> String {
        format!("/{path}")
    }

    fn open_array(&self, path: &str) -> Result<ZarrArray> {
        self.ensure_open()?;
        Array::open(self.storage.clone(), &Self::key(path)).map_err(|e| Error::store(path, e))
    }
}

fn is_node_dir(dir: &Path) -> bool {
    METADATA_FILES.iter().any(|name| dir.join(name).is_file())
}

fn map_dtype(dtype: &ZarrDataType, path: &str) -> Result<DataType> {
    let mapped = match dtype {
        ZarrDataType::Bool => DataType::Bool,
        ZarrDataType::Int8 | ZarrDataType::Int16 | ZarrDataType::Int32 => DataType::I32,
        ZarrDataType::Int64 => DataType::I64,
        ZarrDataType::UInt8 | ZarrDataType::UInt16 | ZarrDataType::UInt32 => DataType::U32,
        ZarrDataType::UInt64 => DataType::U64,
        ZarrDataType::Float32 => DataType::F32,
        ZarrDataType::Float64 => DataType::F64,
        ZarrDataType::String => DataType::Str,
        other => {
            return Err(Error::decode(
                path,
                format!("unsupported array data type {other:?}"),
            ))
        }
    };
    Ok(mapped)
}

macro_rules! retrieve {
    ($array:expr, $subset:expr, $ty:ty, $path:expr) => {
        $array
            .retrieve_array_subset_elements::<$ty>($subset)
            .map_err(|e| Error::store($path, e))?
    };
}

fn read_subset(array: &ZarrArray, subset: &ArraySubset, path: &str) -> Result<ArrayData> {
    let data = match array.data_type() {
        ZarrDataType::Bool => ArrayData::Bool(retrieve!(array, subset, bool, path)),
        ZarrDataType::Int8 => ArrayData::I32(
            retrieve!(array, subset, i8, path)
                .into_iter()
                .map(i32::from)
                .collect(),
        ),
        ZarrDataType::Int16 => ArrayData::I32(
            retrieve!(array, subset, i16, path)
                .into_iter()
                .map(i32::from)
                .collect(),
        ),
        ZarrDataType::Int32 => ArrayData::I32(retrieve!(array, subset, i32, path)),
        ZarrDataType::Int64 => ArrayData::I64(retrieve!(array, subset, i64, path)),
        ZarrDataType::UInt8 => ArrayData::U32(
            retrieve!(array, subset, u8, path)
                .into_iter()
                .map(u32::from)
                .collect(),
        ),
        ZarrDataType::UInt16 => ArrayData::U32(
            retrieve!(array, subset, u16, path)
                .into_iter()
                .map(u32::from)
                .collect(),
        ),
        ZarrDataType::UInt32 => ArrayData::U32(retrieve!(array, subset, u32, path)),
        ZarrDataType::UInt64 => ArrayData::U64(retrieve!(array, subset, u64, path)),
        ZarrDataType::Float32 => ArrayData::F32(retrieve!(array, subset, f32, path)),
        ZarrDataType::Float64 => ArrayData::F64(retrieve!(array, subset, f64, path)),
        ZarrDataType::String => ArrayData::Str(retrieve!(array, subset, String, path)),
        other => {
            return Err(Error::decode(
                path,
                format!("unsupported array data type {other:?}"),
            ))
        }
    };
    Ok(data)
}

impl Container for ZarrStore {
    fn format(&self) -> FileFormat {
        FileFormat::Zarr
    }

    fn location(&self) -> &Path {
        &self.root
    }

    fn contains(&self, path: &str) -> Result<bool> {
        self.ensure_open()?;
        let dir = self.node_dir(path);
        if path.is_empty() {
            return Ok(dir.is_dir());
        }
        Ok(dir.is_dir() && is_node_dir(&dir))
    }

    fn children(&self, path: &str) -> Result<Vec<String>> {
        self.ensure_open()?;
        let dir = self.node_dir(path);
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || !entry.file_type()?.is_dir() {
                continue;
            }
            if is_node_dir(&entry.path()) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn node_kind(&self, path: &str) -> Result<NodeKind> {
        self.ensure_open()?;
        if Array::open(self.storage.clone(), &Self::key(path)).is_ok() {
            return Ok(NodeKind::Array);
        }
        if self.contains(path)? {
            Ok(NodeKind::Group)
        } else {
            Err(Error::store(path, "no such node"))
        }
    }

    fn attributes(&self, path: &str) -> Result<Attributes> {
        self.ensure_open()?;
        let key = Self::key(path);
        if let Ok(array) = Array::open(self.storage.clone(), &key) {
            return Ok(array.attributes().clone());
        }
        let group = Group::open(self.storage.clone(), &key).map_err(|e| Error::store(path, e))?;
        Ok(group.attributes().clone())
    }

    fn array_info(&self, path: &str) -> Result<ArrayInfo> {
        let array = self.open_array(path)?;
        let shape = array
            .shape()
            .iter()
            .map(|&d| usize::try_from(d).map_err(|_| Error::decode(path, "dimension overflow")))
            .collect::<Result<Vec<_>>>()?;
        Ok(ArrayInfo {
            shape,
            dtype: map_dtype(array.data_type(), path)?,
        })
    }

    fn read_array(&self, path: &str) -> Result<ArrayData> {
        let array = self.open_array(path)?;
        if array.shape().iter().any(|&d| d == 0) {
            return Ok(ArrayData::empty(map_dtype(array.data_type(), path)?));
        }
        read_subset(&array, &array.subset_all(), path)
    }

    fn read_array_range(&self, path: &str, range: Range<usize>) -> Result<ArrayData> {
        let array = self.open_array(path)?;
        let len = match array.shape() {
            [len] => *len,
            other => {
                return Err(Error::decode(
                    path,
                    format!("range read needs a 1-d array, found {} dims", other.len()),
                ))
            }
        };
        let (start, end) = (range.start as u64, range.end as u64);
        if start > end || end > len {
            return Err(annread_core::CoreError::InvalidRange.into());
        }
        if start == end {
            return Ok(ArrayData::empty(map_dtype(array.data_type(), path)?));
        }
        let subset = ArraySubset::new_with_ranges(&[start..end]);
        read_subset(&array, &subset, path)
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn close(&self) -> Result<()> {
        if self.open.swap(false, Ordering::AcqRel) {
            debug!(path = %self.root.display(), "closed directory store");
        }
        Ok(())
    }
}

impl fmt::Debug for ZarrStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZarrStore")
            .field("root", &self.root)
            .field("open", &self.is_open())
            .finish()
    }
}
