//! Abstract interfaces shared by in-memory and backed matrices

pub mod element;
pub mod matrix;

pub use element::MatrixElement;
pub use matrix::SparseMatrix;
#[cfg(feature = "alloc")]
pub use matrix::MatrixOperations;
