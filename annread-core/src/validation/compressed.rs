//! Compressed sparse layout validation
//!
//! A compressed layout stores one index pointer per major-axis slot plus a
//! trailing total. Entries of major slot `i` live at
//! `indptr[i]..indptr[i + 1]` in both `indices` and `data`.

use crate::CoreError;

/// Validate an index pointer array against the major-axis length
///
/// Returns the number of stored entries it describes.
pub fn validate_indptr(indptr: &[usize], major_len: usize) -> Result<usize, CoreError> {
    if indptr.len() != major_len + 1 {
        return Err(CoreError::InvalidIndptr);
    }
    if indptr[0] != 0 {
        return Err(CoreError::InvalidIndptr);
    }
    if indptr.windows(2).any(|w| w[0] > w[1]) {
        return Err(CoreError::InvalidIndptr);
    }
    Ok(indptr[major_len])
}

/// Validate a full compressed layout
pub fn validate_compressed(
    major_len: usize,
    minor_len: usize,
    indptr: &[usize],
    indices: &[usize],
    data_len: usize,
) -> Result<(), CoreError> {
    let nnz = validate_indptr(indptr, major_len)?;
    if indices.len() != nnz || data_len != nnz {
        return Err(CoreError::LengthMismatch);
    }
    if indices.iter().any(|&i| i >= minor_len) {
        return Err(CoreError::IndexOutOfBounds);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_indptr() {
        assert_eq!(validate_indptr(&[0, 2, 2, 5], 3), Ok(5));
        assert_eq!(validate_indptr(&[0], 0), Ok(0));
        assert_eq!(validate_indptr(&[0, 2], 2), Err(CoreError::InvalidIndptr));
        assert_eq!(validate_indptr(&[1, 2], 1), Err(CoreError::InvalidIndptr));
        assert_eq!(validate_indptr(&[0, 3, 2], 2), Err(CoreError::InvalidIndptr));
    }

    #[test]
    fn test_validate_compressed() {
        assert_eq!(validate_compressed(2, 3, &[0, 1, 3], &[2, 0, 1], 3), Ok(()));
        assert_eq!(
            validate_compressed(2, 3, &[0, 1, 3], &[2, 0], 3),
            Err(CoreError::LengthMismatch)
        );
        assert_eq!(
            validate_compressed(2, 3, &[0, 1, 3], &[2, 0, 1], 2),
            Err(CoreError::LengthMismatch)
        );
        assert_eq!(
            validate_compressed(2, 3, &[0, 1, 3], &[2, 0, 3], 3),
            Err(CoreError::IndexOutOfBounds)
        );
    }
}
