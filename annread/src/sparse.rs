//! In-memory compressed sparse matrices
//!
//! A [`CompressedMatrix`] is either row-major (CSR) or column-major (CSC).
//! Construction always goes through structural validation, so every value
//! of this type has a consistent `indptr`/`indices`/`data` layout.

use std::ops::Range;

use annread_core::{
    validate_compressed, validate_range, DataType, EncodingType, MatrixElement,
    MatrixOperations, SparseMatrix,
};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::value::{ArrayData, DenseArray};

/// Orientation of a compressed layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SparseFormat {
    Csr,
    Csc,
}

impl SparseFormat {
    pub fn from_encoding(encoding: EncodingType) -> Option<Self> {
        match encoding {
            EncodingType::CsrMatrix => Some(SparseFormat::Csr),
            EncodingType::CscMatrix => Some(SparseFormat::Csc),
            _ => None,
        }
    }

    pub fn encoding(&self) -> EncodingType {
        match self {
            SparseFormat::Csr => EncodingType::CsrMatrix,
            SparseFormat::Csc => EncodingType::CscMatrix,
        }
    }

    /// (major, minor) lengths for a (rows, cols) shape
    pub fn major_minor(&self, shape: (usize, usize)) -> (usize, usize) {
        match self {
            SparseFormat::Csr => shape,
            SparseFormat::Csc => (shape.1, shape.0),
        }
    }
}

impl std::fmt::Display for SparseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            SparseFormat::Csr => "csr",
            SparseFormat::Csc => "csc",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressedMatrix {
    format: SparseFormat,
    shape: (usize, usize),
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: ArrayData,
}

impl CompressedMatrix {
    pub fn new(
        format: SparseFormat,
        shape: (usize, usize),
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: ArrayData,
    ) -> Result<Self> {
        let (major, minor) = format.major_minor(shape);
        validate_compressed(major, minor, &indptr, &indices, data.len())?;
        Ok(CompressedMatrix {
            format,
            shape,
            indptr,
            indices,
            data,
        })
    }

    pub fn format(&self) -> SparseFormat {
        self.format
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn dtype(&self) -> DataType {
        self.data.dtype()
    }

    pub fn indptr(&self) -> &[usize] {
        &self.indptr
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    fn major_len(&self) -> usize {
        self.indptr.len() - 1
    }

    /// Row-major copy of this matrix
    pub fn to_csr(&self) -> CompressedMatrix {
        match self.format {
            SparseFormat::Csr => self.clone(),
            SparseFormat::Csc => self.transpose_layout(),
        }
    }

    pub fn into_csr(self) -> CompressedMatrix {
        match self.format {
            SparseFormat::Csr => self,
            SparseFormat::Csc => self.transpose_layout(),
        }
    }

    // Same matrix, opposite orientation. Minor indices come out sorted.
    fn transpose_layout(&self) -> CompressedMatrix {
        let (major, minor) = self.format.major_minor(self.shape);
        let mut counts = vec![0usize; minor + 1];
        for &i in &self.indices {
            counts[i + 1] += 1;
        }
        for i in 0..minor {
            counts[i + 1] += counts[i];
        }
        let indptr = counts.clone();

        let mut next = counts;
        let mut indices = vec![0usize; self.nnz()];
        let mut positions = vec![0usize; self.nnz()];
        for m in 0..major {
            for p in self.indptr[m]..self.indptr[m + 1] {
                let slot = &mut next[self.indices[p]];
                indices[*slot] = m;
                positions[*slot] = p;
                *slot += 1;
            }
        }

        let format = match self.format {
            SparseFormat::Csr => SparseFormat::Csc,
            SparseFormat::Csc => SparseFormat::Csr,
        };
        CompressedMatrix {
            format,
            shape: self.shape,
            indptr,
            indices,
            data: self.data.gather(&positions),
        }
    }

    /// Compress a dense matrix into CSR form
    ///
    /// Rows are scanned in parallel. Vectors become a single row and
    /// scalars a 1x1 matrix. String arrays cannot be compressed.
    pub fn from_dense(dense: &DenseArray) -> Result<CompressedMatrix> {
        let (rows, cols) = dense.matrix_dims().ok_or_else(|| {
            Error::conversion(
                "",
                format!("{}-dimensional array has no matrix form", dense.ndim()),
            )
        })?;

        let (indptr, indices, data) = match dense.data() {
            ArrayData::F32(v) => compress_rows(v, rows, cols, ArrayData::F32),
            ArrayData::F64(v) => compress_rows(v, rows, cols, ArrayData::F64),
            ArrayData::I32(v) => compress_rows(v, rows, cols, ArrayData::I32),
            ArrayData::I64(v) => compress_rows(v, rows, cols, ArrayData::I64),
            ArrayData::U32(v) => compress_rows(v, rows, cols, ArrayData::U32),
            ArrayData::U64(v) => compress_rows(v, rows, cols, ArrayData::U64),
            ArrayData::Bool(v) => compress_rows(v, rows, cols, ArrayData::Bool),
            ArrayData::Str(_) => {
                return Err(Error::conversion("", "string arrays have no sparse form"))
            }
        };

        CompressedMatrix::new(SparseFormat::Csr, (rows, cols), indptr, indices, data)
    }

    /// Expand into a row-major dense matrix
    pub fn to_dense(&self) -> Result<DenseArray> {
        let (rows, cols) = self.shape;
        let csr = self.to_csr();
        let data = match &csr.data {
            ArrayData::F32(v) => ArrayData::F32(scatter_rows(&csr, v, cols)),
            ArrayData::F64(v) => ArrayData::F64(scatter_rows(&csr, v, cols)),
            ArrayData::I32(v) => ArrayData::I32(scatter_rows(&csr, v, cols)),
            ArrayData::I64(v) => ArrayData::I64(scatter_rows(&csr, v, cols)),
            ArrayData::U32(v) => ArrayData::U32(scatter_rows(&csr, v, cols)),
            ArrayData::U64(v) => ArrayData::U64(scatter_rows(&csr, v, cols)),
            ArrayData::Bool(v) => ArrayData::Bool(scatter_rows(&csr, v, cols)),
            ArrayData::Str(_) => {
                return Err(Error::conversion("", "string values have no dense form"))
            }
        };
        DenseArray::new(vec![rows, cols], data)
    }

    /// Stored value at (row, col) as `f64`
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.shape.0 || col >= self.shape.1 {
            return None;
        }
        let (major, minor) = match self.format {
            SparseFormat::Csr => (row, col),
            SparseFormat::Csc => (col, row),
        };
        let span = self.indptr[major]..self.indptr[major + 1];
        self.indices[span.clone()]
            .iter()
            .position(|&i| i == minor)
            .and_then(|offset| self.data.get_f64(span.start + offset))
    }

    /// Sub-matrix over a range of the major axis
    ///
    /// For CSR this selects rows, for CSC columns.
    pub fn slice_major(&self, range: Range<usize>) -> Result<CompressedMatrix> {
        validate_range(&range, self.major_len())?;
        let span = self.indptr[range.start]..self.indptr[range.end];
        let base = span.start;
        let indptr = self.indptr[range.start..=range.end]
            .iter()
            .map(|&p| p - base)
            .collect();
        let len = range.end - range.start;
        let shape = match self.format {
            SparseFormat::Csr => (len, self.shape.1),
            SparseFormat::Csc => (self.shape.0, len),
        };
        Ok(CompressedMatrix {
            format: self.format,
            shape,
            indptr,
            indices: self.indices[span.clone()].to_vec(),
            data: self.data.slice(span),
        })
    }
}

type Compressed = (Vec<usize>, Vec<usize>, ArrayData);

fn compress_rows<T>(
    values: &[T],
    rows: usize,
    cols: usize,
    wrap: fn(Vec<T>) -> ArrayData,
) -> Compressed
where
    T: MatrixElement + Send + Sync,
{
    if rows == 0 || cols == 0 {
        return (vec![0; rows + 1], Vec::new(), wrap(Vec::new()));
    }

    let per_row: Vec<(Vec<usize>, Vec<T>)> = values
        .par_chunks(cols)
        .map(|row| {
            let mut row_cols = Vec::new();
            let mut row_vals = Vec::new();
            for (j, &v) in row.iter().enumerate() {
                if !v.is_zero() {
                    row_cols.push(j);
                    row_vals.push(v);
                }
            }
            (row_cols, row_vals)
        })
        .collect();

    let nnz = per_row.iter().map(|(c, _)| c.len()).sum();
    let mut indptr = Vec::with_capacity(rows + 1);
    let mut indices = Vec::with_capacity(nnz);
    let mut data = Vec::with_capacity(nnz);
    indptr.push(0);
    for (c, v) in per_row {
        indices.extend(c);
        data.extend(v);
        indptr.push(indices.len());
    }
    (indptr, indices, wrap(data))
}

fn scatter_rows<T: MatrixElement>(csr: &CompressedMatrix, values: &[T], cols: usize) -> Vec<T> {
    let mut dense = vec![T::zero(); csr.shape.0 * cols];
    for row in 0..csr.shape.0 {
        for p in csr.indptr[row]..csr.indptr[row + 1] {
            dense[row * cols + csr.indices[p]] = values[p];
        }
    }
    dense
}

impl SparseMatrix for CompressedMatrix {
    type Element = f64;

    fn get_element(&self, row: usize, col: usize) -> Option<f64> {
        self.get(row, col)
    }

    fn dimensions(&self) -> (usize, usize) {
        self.shape
    }

    fn nnz(&self) -> usize {
        self.indices.len()
    }
}

impl MatrixOperations for CompressedMatrix {
    fn get_row(&self, row_index: usize) -> Vec<f64> {
        if row_index >= self.shape.0 {
            return Vec::new();
        }
        match self.format {
            SparseFormat::Csr => (self.indptr[row_index]..self.indptr[row_index + 1])
                .filter_map(|p| self.data.get_f64(p))
                .collect(),
            SparseFormat::Csc => (0..self.shape.1)
                .filter_map(|col| self.get(row_index, col))
                .collect(),
        }
    }

    fn get_col(&self, col_index: usize) -> Vec<f64> {
        if col_index >= self.shape.1 {
            return Vec::new();
        }
        match self.format {
            SparseFormat::Csc => (self.indptr[col_index]..self.indptr[col_index + 1])
                .filter_map(|p| self.data.get_f64(p))
                .collect(),
            SparseFormat::Csr => (0..self.shape.0)
                .filter_map(|row| self.get(row, col_index))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annread_core::CoreError;

    // [[1, 0, 2],
    //  [0, 0, 3],
    //  [4, 5, 0]]
    fn csr_fixture() -> CompressedMatrix {
        CompressedMatrix::new(
            SparseFormat::Csr,
            (3, 3),
            vec![0, 2, 3, 5],
            vec![0, 2, 2, 0, 1],
            ArrayData::F32(vec![1.0, 2.0, 3.0, 4.0, 5.0]),
        )
        .unwrap()
    }

    fn csc_fixture() -> CompressedMatrix {
        CompressedMatrix::new(
            SparseFormat::Csc,
            (3, 3),
            vec![0, 2, 3, 5],
            vec![0, 2, 2, 0, 1],
            ArrayData::F32(vec![1.0, 4.0, 5.0, 2.0, 3.0]),
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_bad_layout() {
        let bad = CompressedMatrix::new(
            SparseFormat::Csr,
            (2, 2),
            vec![0, 1, 2],
            vec![0, 2],
            ArrayData::F64(vec![1.0, 1.0]),
        );
        assert!(matches!(bad, Err(Error::Core(CoreError::IndexOutOfBounds))));
    }

    #[test]
    fn test_csc_to_csr_matches() {
        let csr = csc_fixture().to_csr();
        assert_eq!(csr, csr_fixture());
    }

    #[test]
    fn test_from_dense_roundtrip() {
        let dense = DenseArray::new(
            vec![3, 3],
            ArrayData::F32(vec![1.0, 0.0, 2.0, 0.0, 0.0, 3.0, 4.0, 5.0, 0.0]),
        )
        .unwrap();
        let csr = CompressedMatrix::from_dense(&dense).unwrap();
        assert_eq!(csr, csr_fixture());
        assert_eq!(csr.to_dense().unwrap(), dense);
    }

    #[test]
    fn test_from_dense_vector_and_empty() {
        let vector = DenseArray::vector(ArrayData::I64(vec![0, 7, 0]));
        let csr = CompressedMatrix::from_dense(&vector).unwrap();
        assert_eq!(csr.shape(), (1, 3));
        assert_eq!(csr.nnz(), 1);
        assert_eq!(csr.get(0, 1), Some(7.0));

        let empty = DenseArray::new(vec![2, 0], ArrayData::F64(Vec::new())).unwrap();
        let csr = CompressedMatrix::from_dense(&empty).unwrap();
        assert_eq!(csr.indptr(), &[0, 0, 0]);
        assert_eq!(csr.nnz(), 0);
    }

    #[test]
    fn test_from_dense_rejects_strings() {
        let strings = DenseArray::vector(ArrayData::Str(vec!["a".into()]));
        assert!(matches!(
            CompressedMatrix::from_dense(&strings),
            Err(Error::Conversion { .. })
        ));
    }

    #[test]
    fn test_get_both_formats() {
        for m in [csr_fixture(), csc_fixture()] {
            assert_eq!(m.get(0, 2), Some(2.0));
            assert_eq!(m.get(2, 1), Some(5.0));
            assert_eq!(m.get(1, 1), None);
            assert_eq!(m.get(3, 0), None);
        }
    }

    #[test]
    fn test_slice_major() {
        let rows = csr_fixture().slice_major(1..3).unwrap();
        assert_eq!(rows.shape(), (2, 3));
        assert_eq!(rows.indptr(), &[0, 1, 3]);
        assert_eq!(rows.get(1, 0), Some(4.0));
        assert!(csr_fixture().slice_major(2..4).is_err());

        let cols = csc_fixture().slice_major(0..1).unwrap();
        assert_eq!(cols.shape(), (3, 1));
        assert_eq!(cols.get(2, 0), Some(4.0));
    }

    #[test]
    fn test_row_and_col_access() {
        let m = csr_fixture();
        assert_eq!(m.get_row(2), vec![4.0, 5.0]);
        assert_eq!(m.get_col(2), vec![2.0, 3.0]);
        assert_eq!(csc_fixture().get_row(0), vec![1.0, 2.0]);
        assert_eq!(m.dimensions(), (3, 3));
    }
}
