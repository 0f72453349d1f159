//! Sparse handles
//!
//! A [`SparseHandle`] is what a sparse slot becomes when the caller asks
//! for backed access. The backed variant keeps the container open and reads
//! only the spans of `data` and `indices` that a requested row range needs;
//! `indptr` is read once on first use.

use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use annread_core::{validate_range, DataType, EncodingType};
use tracing::debug;

use crate::decode::{sparse_shape, SparseParts};
use crate::error::{Error, Result};
use crate::sparse::{CompressedMatrix, SparseFormat};
use crate::store::Container;

/// Lazy view of a stored compressed sparse group
pub struct BackedSparse {
    container: Arc<dyn Container>,
    path: String,
    parts: SparseParts,
    format: SparseFormat,
    shape: (usize, usize),
    dtype: DataType,
    nnz: usize,
    indptr: OnceLock<Vec<usize>>,
    elements_read: AtomicUsize,
}

impl BackedSparse {
    /// Open a handle over the group at `path`
    ///
    /// Only metadata is read here: the shape attribute and the description
    /// of the value array.
    pub fn open(container: Arc<dyn Container>, path: &str, encoding: EncodingType) -> Result<Self> {
        let format = SparseFormat::from_encoding(encoding)
            .ok_or_else(|| Error::decode(path, format!("`{encoding}` is not a sparse encoding")))?;
        let shape = sparse_shape(container.as_ref(), path)?;
        let parts = SparseParts::of(path);
        let info = container.array_info(&parts.data)?;
        debug!(path, ?format, ?shape, nnz = info.len(), "opened backed sparse handle");
        Ok(BackedSparse {
            path: path.to_string(),
            format,
            shape,
            dtype: info.dtype,
            nnz: info.len(),
            parts,
            container,
            indptr: OnceLock::new(),
            elements_read: AtomicUsize::new(0),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn format(&self) -> SparseFormat {
        self.format
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    pub fn nnz(&self) -> usize {
        self.nnz
    }

    /// Stored entries pulled from the container so far
    pub fn elements_read(&self) -> usize {
        self.elements_read.load(Ordering::Relaxed)
    }

    pub fn is_open(&self) -> bool {
        self.container.is_open()
    }

    fn major_len(&self) -> usize {
        self.format.major_minor(self.shape).0
    }

    fn indptr(&self) -> Result<&[usize]> {
        if let Some(indptr) = self.indptr.get() {
            return Ok(indptr);
        }
        let indptr = self
            .container
            .read_array(&self.parts.indptr)?
            .into_usize_vec(&self.parts.indptr)?;
        annread_core::validate_indptr(&indptr, self.major_len())
            .map_err(|e| Error::decode(&self.parts.indptr, e.to_string()))?;
        Ok(self.indptr.get_or_init(|| indptr))
    }

    /// Read a range of the major axis (rows for CSR, columns for CSC)
    pub fn read_major(&self, range: Range<usize>) -> Result<CompressedMatrix> {
        validate_range(&range, self.major_len())?;
        let indptr = self.indptr()?;
        let span = indptr[range.start]..indptr[range.end];

        let data = self
            .container
            .read_array_range(&self.parts.data, span.clone())?;
        let indices = self
            .container
            .read_array_range(&self.parts.indices, span.clone())?
            .into_usize_vec(&self.parts.indices)?;
        self.elements_read.fetch_add(span.len(), Ordering::Relaxed);

        let local_indptr = indptr[range.start..=range.end]
            .iter()
            .map(|&p| p - span.start)
            .collect();
        let len = range.end - range.start;
        let shape = match self.format {
            SparseFormat::Csr => (len, self.shape.1),
            SparseFormat::Csc => (self.shape.0, len),
        };
        CompressedMatrix::new(self.format, shape, local_indptr, indices, data)
            .map_err(|e| Error::decode(&self.path, e.to_string()))
    }

    /// Read a range of rows as CSR
    ///
    /// Column-major groups have no row-contiguous layout, so the whole
    /// group is loaded and sliced.
    pub fn read_rows(&self, range: Range<usize>) -> Result<CompressedMatrix> {
        match self.format {
            SparseFormat::Csr => self.read_major(range),
            SparseFormat::Csc => {
                validate_range(&range, self.shape.0)?;
                self.to_memory()?.into_csr().slice_major(range)
            }
        }
    }

    /// Load the whole group
    pub fn to_memory(&self) -> Result<CompressedMatrix> {
        self.read_major(0..self.major_len())
    }
}

impl fmt::Debug for BackedSparse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackedSparse")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("shape", &self.shape)
            .field("dtype", &self.dtype)
            .field("nnz", &self.nnz)
            .field("elements_read", &self.elements_read())
            .finish()
    }
}

/// Sparse matrix handed out for backed or wrapped slots
#[derive(Debug)]
pub enum SparseHandle {
    InMemory(CompressedMatrix),
    Backed(BackedSparse),
}

impl SparseHandle {
    pub fn is_backed(&self) -> bool {
        matches!(self, SparseHandle::Backed(_))
    }

    pub fn shape(&self) -> (usize, usize) {
        match self {
            SparseHandle::InMemory(m) => m.shape(),
            SparseHandle::Backed(b) => b.shape(),
        }
    }

    pub fn format(&self) -> SparseFormat {
        match self {
            SparseHandle::InMemory(m) => m.format(),
            SparseHandle::Backed(b) => b.format(),
        }
    }

    pub fn dtype(&self) -> DataType {
        match self {
            SparseHandle::InMemory(m) => m.dtype(),
            SparseHandle::Backed(b) => b.dtype(),
        }
    }

    pub fn nnz(&self) -> usize {
        match self {
            SparseHandle::InMemory(m) => m.nnz(),
            SparseHandle::Backed(b) => b.nnz(),
        }
    }

    /// Range of rows as CSR
    pub fn read_rows(&self, range: Range<usize>) -> Result<CompressedMatrix> {
        match self {
            SparseHandle::InMemory(m) => m.to_csr().slice_major(range),
            SparseHandle::Backed(b) => b.read_rows(range),
        }
    }

    pub fn to_memory(&self) -> Result<CompressedMatrix> {
        match self {
            SparseHandle::InMemory(m) => Ok(m.clone()),
            SparseHandle::Backed(b) => b.to_memory(),
        }
    }

    pub fn as_backed(&self) -> Option<&BackedSparse> {
        match self {
            SparseHandle::Backed(b) => Some(b),
            SparseHandle::InMemory(_) => None,
        }
    }
}
