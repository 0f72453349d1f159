//! Single-file backend on top of the `hdf5` bindings
//!
//! The file handle is an exclusive resource: [`Container::close`] drops it,
//! and any later read reports [`Error::ContainerClosed`].

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use annread_core::{DataType, FileFormat};
use hdf5::types::{FloatSize, IntSize, TypeDescriptor, VarLenAscii, VarLenUnicode};
use tracing::debug;

use super::{ArrayInfo, Attributes, Container, NodeKind};
use crate::error::{Error, Result};
use crate::value::ArrayData;

pub struct H5adStore {
    path: PathBuf,
    file: RwLock<Option<hdf5::File>>,
}

impl H5adStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = hdf5::File::open(&path).map_err(|e| Error::store("", e))?;
        debug!(path = %path.display(), "opened single-file container");
        Ok(H5adStore {
            path,
            file: RwLock::new(Some(file)),
        })
    }

    fn with_file<T>(&self, f: impl FnOnce(&hdf5::File) -> Result<T>) -> Result<T> {
        let guard = self.file.read().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(file) => f(file),
            None => Err(Error::ContainerClosed),
        }
    }
}

fn descriptor(dtype: hdf5::Result<hdf5::Datatype>, path: &str) -> Result<TypeDescriptor> {
    dtype
        .and_then(|t| t.to_descriptor())
        .map_err(|e| Error::store(path, e))
}

fn map_dtype(desc: &TypeDescriptor, path: &str) -> Result<DataType> {
    let mapped = match desc {
        TypeDescriptor::Integer(IntSize::U8) => DataType::I64,
        TypeDescriptor::Integer(_) => DataType::I32,
        TypeDescriptor::Unsigned(IntSize::U8) => DataType::U64,
        TypeDescriptor::Unsigned(_) => DataType::U32,
        TypeDescriptor::Float(FloatSize::U4) => DataType::F32,
        TypeDescriptor::Float(_) => DataType::F64,
        TypeDescriptor::Boolean => DataType::Bool,
        TypeDescriptor::VarLenUnicode | TypeDescriptor::VarLenAscii => DataType::Str,
        other => {
            return Err(Error::decode(
                path,
                format!("unsupported element type {other:?}"),
            ))
        }
    };
    Ok(mapped)
}

fn read_dataset(ds: &hdf5::Dataset, path: &str) -> Result<ArrayData> {
    let desc = descriptor(ds.dtype(), path)?;
    let err = |e: hdf5::Error| Error::store(path, e);
    let data = match desc {
        TypeDescriptor::VarLenUnicode => ArrayData::Str(
            ds.read_raw::<VarLenUnicode>()
                .map_err(err)?
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
        ),
        TypeDescriptor::VarLenAscii => ArrayData::Str(
            ds.read_raw::<VarLenAscii>()
                .map_err(err)?
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
        ),
        other => match map_dtype(&other, path)? {
            DataType::F32 => ArrayData::F32(ds.read_raw::<f32>().map_err(err)?),
            DataType::F64 => ArrayData::F64(ds.read_raw::<f64>().map_err(err)?),
            DataType::I32 => ArrayData::I32(ds.read_raw::<i32>().map_err(err)?),
            DataType::I64 => ArrayData::I64(ds.read_raw::<i64>().map_err(err)?),
            DataType::U32 => ArrayData::U32(ds.read_raw::<u32>().map_err(err)?),
            DataType::U64 => ArrayData::U64(ds.read_raw::<u64>().map_err(err)?),
            DataType::Bool => ArrayData::Bool(ds.read_raw::<bool>().map_err(err)?),
            DataType::Str => return Err(Error::decode(path, "fixed-length strings")),
        },
    };
    Ok(data)
}

fn read_dataset_range(ds: &hdf5::Dataset, path: &str, range: Range<usize>) -> Result<ArrayData> {
    let desc = descriptor(ds.dtype(), path)?;
    let err = |e: hdf5::Error| Error::store(path, e);
    let data = match desc {
        TypeDescriptor::VarLenUnicode => ArrayData::Str(
            ds.read_slice_1d::<VarLenUnicode, _>(range)
                .map_err(err)?
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
        ),
        TypeDescriptor::VarLenAscii => ArrayData::Str(
            ds.read_slice_1d::<VarLenAscii, _>(range)
                .map_err(err)?
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
        ),
        other => match map_dtype(&other, path)? {
            DataType::F32 => {
                ArrayData::F32(ds.read_slice_1d::<f32, _>(range).map_err(err)?.to_vec())
            }
            DataType::F64 => {
                ArrayData::F64(ds.read_slice_1d::<f64, _>(range).map_err(err)?.to_vec())
            }
            DataType::I32 => {
                ArrayData::I32(ds.read_slice_1d::<i32, _>(range).map_err(err)?.to_vec())
            }
            DataType::I64 => {
                ArrayData::I64(ds.read_slice_1d::<i64, _>(range).map_err(err)?.to_vec())
            }
            DataType::U32 => {
                ArrayData::U32(ds.read_slice_1d::<u32, _>(range).map_err(err)?.to_vec())
            }
            DataType::U64 => {
                ArrayData::U64(ds.read_slice_1d::<u64, _>(range).map_err(err)?.to_vec())
            }
            DataType::Bool => {
                ArrayData::Bool(ds.read_slice_1d::<bool, _>(range).map_err(err)?.to_vec())
            }
            DataType::Str => return Err(Error::decode(path, "fixed-length strings")),
        },
    };
    Ok(data)
}

fn json_number(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

// Scalars become plain values, everything else a JSON array.
fn attr_to_json(attr: &hdf5::Attribute, path: &str) -> Result<serde_json::Value> {
    let err = |e: hdf5::Error| Error::store(path, e);
    let values: Vec<serde_json::Value> = match descriptor(attr.dtype(), path)? {
        TypeDescriptor::VarLenUnicode => attr
            .read_raw::<VarLenUnicode>()
            .map_err(err)?
            .iter()
            .map(|s| serde_json::Value::String(s.as_str().to_string()))
            .collect(),
        TypeDescriptor::VarLenAscii => attr
            .read_raw::<VarLenAscii>()
            .map_err(err)?
            .iter()
            .map(|s| serde_json::Value::String(s.as_str().to_string()))
            .collect(),
        TypeDescriptor::Boolean => attr
            .read_raw::<bool>()
            .map_err(err)?
            .into_iter()
            .map(serde_json::Value::Bool)
            .collect(),
        TypeDescriptor::Integer(_) => attr
            .read_raw::<i64>()
            .map_err(err)?
            .into_iter()
            .map(serde_json::Value::from)
            .collect(),
        TypeDescriptor::Unsigned(_) => attr
            .read_raw::<u64>()
            .map_err(err)?
            .into_iter()
            .map(serde_json::Value::from)
            .collect(),
        TypeDescriptor::Float(_) => attr
            .read_raw::<f64>()
            .map_err(err)?
            .into_iter()
            .map(json_number)
            .collect(),
        _ => return Ok(serde_json::Value::Null),
    };

    if attr.is_scalar() {
        Ok(values.into_iter().next().unwrap_or(serde_json::Value::Null))
    } else {
        Ok(serde_json::Value::Array(values))
    }
}

fn read_attributes(location: &hdf5::Location, path: &str) -> Result<Attributes> {
    let mut attrs = Attributes::new();
    let names = location.attr_names().map_err(|e| Error::store(path, e))?;
    for name in names {
        let attr = location.attr(&name).map_err(|e| Error::store(path, e))?;
        attrs.insert(name, attr_to_json(&attr, path)?);
    }
    Ok(attrs)
}

impl Container for H5adStore {
    fn format(&self) -> FileFormat {
        FileFormat::H5ad
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn contains(&self, path: &str) -> Result<bool> {
        self.with_file(|file| {
            let mut prefix = String::new();
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                if !prefix.is_empty() {
                    prefix.push('/');
                }
                prefix.push_str(segment);
                if !file.link_exists(&prefix) {
                    return Ok(false);
                }
            }
            Ok(true)
        })
    }

    fn children(&self, path: &str) -> Result<Vec<String>> {
        self.with_file(|file| {
            let listed = if path.is_empty() {
                file.member_names()
            } else if let Ok(group) = file.group(path) {
                group.member_names()
            } else {
                Ok(Vec::new())
            };
            let mut names = listed.map_err(|e| Error::store(path, e))?;
            names.sort();
            Ok(names)
        })
    }

    fn node_kind(&self, path: &str) -> Result<NodeKind> {
        self.with_file(|file| {
            if path.is_empty() || file.group(path).is_ok() {
                Ok(NodeKind::Group)
            } else if file.dataset(path).is_ok() {
                Ok(NodeKind::Array)
            } else {
                Err(Error::store(path, "no such node"))
            }
        })
    }

    fn attributes(&self, path: &str) -> Result<Attributes> {
        self.with_file(|file| {
            if path.is_empty() {
                return read_attributes(file, path);
            }
            if let Ok(group) = file.group(path) {
                return read_attributes(&group, path);
            }
            let ds = file.dataset(path).map_err(|e| Error::store(path, e))?;
            read_attributes(&ds, path)
        })
    }

    fn array_info(&self, path: &str) -> Result<ArrayInfo> {
        self.with_file(|file| {
            let ds = file.dataset(path).map_err(|e| Error::store(path, e))?;
            let desc = descriptor(ds.dtype(), path)?;
            Ok(ArrayInfo {
                shape: ds.shape(),
                dtype: map_dtype(&desc, path)?,
            })
        })
    }

    fn read_array(&self, path: &str) -> Result<ArrayData> {
        self.with_file(|file| {
            let ds = file.dataset(path).map_err(|e| Error::store(path, e))?;
            read_dataset(&ds, path)
        })
    }

    fn read_array_range(&self, path: &str, range: Range<usize>) -> Result<ArrayData> {
        self.with_file(|file| {
            let ds = file.dataset(path).map_err(|e| Error::store(path, e))?;
            let len = match ds.shape().as_slice() {
                [len] => *len,
                other => {
                    return Err(Error::decode(
                        path,
                        format!("range read needs a 1-d array, found {} dims", other.len()),
                    ))
                }
            };
            annread_core::validate_range(&range, len)?;
            if range.is_empty() {
                let desc = descriptor(ds.dtype(), path)?;
                return Ok(ArrayData::empty(map_dtype(&desc, path)?));
            }
            read_dataset_range(&ds, path, range)
        })
    }

    fn is_open(&self) -> bool {
        self.file
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    fn close(&self) -> Result<()> {
        let mut guard = self.file.write().unwrap_or_else(|e| e.into_inner());
        if let Some(file) = guard.take() {
            file.close().map_err(|e| Error::store("", e))?;
            debug!(path = %self.path.display(), "closed single-file container");
        }
        Ok(())
    }
}

impl fmt::Debug for H5adStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("H5adStore")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish()
    }
}
