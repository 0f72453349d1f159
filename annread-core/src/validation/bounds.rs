//! Range and shape validation

use crate::CoreError;
use core::ops::Range;

/// Validate that `range` is ordered and lies within `0..len`
pub const fn validate_range(range: &Range<usize>, len: usize) -> Result<(), CoreError> {
    if range.start > range.end || range.end > len {
        return Err(CoreError::InvalidRange);
    }
    Ok(())
}

/// Number of elements described by a shape, with overflow protection
///
/// An empty shape describes a scalar and holds one element.
pub fn checked_element_count(shape: &[usize]) -> Result<usize, CoreError> {
    shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or(CoreError::InvalidShape)
}
