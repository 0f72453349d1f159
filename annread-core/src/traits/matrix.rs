//! Matrix access traits
//!
//! Implemented by the in-memory compressed matrix. Values are surfaced as
//! a single element type so callers can compare matrices regardless of the
//! stored dtype.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use super::element::MatrixElement;

/// Format-agnostic read access to a sparse matrix
pub trait SparseMatrix {
    type Element: MatrixElement;

    /// Stored value at a position
    ///
    /// Returns `None` when the position holds an implicit zero or lies
    /// outside the matrix.
    fn get_element(&self, row: usize, col: usize) -> Option<Self::Element>;

    /// Dimensions as (rows, cols)
    fn dimensions(&self) -> (usize, usize);

    /// Number of explicitly stored entries
    fn nnz(&self) -> usize;
}

/// Row and column extraction (requires the `alloc` feature)
#[cfg(feature = "alloc")]
pub trait MatrixOperations: SparseMatrix {
    /// Stored values of one row, in column order
    fn get_row(&self, row_index: usize) -> Vec<Self::Element>;

    /// Stored values of one column, in row order
    fn get_col(&self, col_index: usize) -> Vec<Self::Element>;
}
