//! Error types for core read-policy operations

/// Errors raised by the pure parts of a partial read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// Path suffix names no supported container format
    UnknownFormat,
    /// Slot name appears twice in a slot specification
    DuplicateSlot,
    /// Slot name or in-container path is empty or malformed
    InvalidSlotPath,
    /// Index pointer array is not a valid compressed layout
    InvalidIndptr,
    /// Index out of bounds
    IndexOutOfBounds,
    /// Array lengths disagree with the declared structure
    LengthMismatch,
    /// Shape product overflows or disagrees with the element count
    InvalidShape,
    /// Range is reversed or extends past the end
    InvalidRange,
}

impl core::fmt::Display for CoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            CoreError::UnknownFormat => "Unknown file format",
            CoreError::DuplicateSlot => "Duplicate slot name",
            CoreError::InvalidSlotPath => "Invalid slot path",
            CoreError::InvalidIndptr => "Invalid index pointer array",
            CoreError::IndexOutOfBounds => "Index out of bounds",
            CoreError::LengthMismatch => "Array length mismatch",
            CoreError::InvalidShape => "Invalid array shape",
            CoreError::InvalidRange => "Invalid range",
        };
        write!(f, "{msg}")
    }
}

impl core::error::Error for CoreError {}

/// Result type for core operations
pub type Result<T> = core::result::Result<T, CoreError>;
