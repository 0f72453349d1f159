//! Element data types shared by every backend

/// Element type of a stored array after widening to the supported set
///
/// Narrow integer types (8 and 16 bit) are widened to 32 bits by the
/// backends, so this list is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DataType {
    F32,
    F64,
    I32,
    I64,
    U32,
    U64,
    Bool,
    Str,
}

impl DataType {
    /// Size in bytes of one element, `None` for variable-length strings
    pub const fn size_bytes(&self) -> Option<usize> {
        match self {
            DataType::F32 | DataType::I32 | DataType::U32 => Some(4),
            DataType::F64 | DataType::I64 | DataType::U64 => Some(8),
            DataType::Bool => Some(1),
            DataType::Str => None,
        }
    }

    pub const fn is_numeric(&self) -> bool {
        !matches!(self, DataType::Str)
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, DataType::F32 | DataType::F64)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            DataType::F32 => "f32",
            DataType::F64 => "f64",
            DataType::I32 => "i32",
            DataType::I64 => "i64",
            DataType::U32 => "u32",
            DataType::U64 => "u64",
            DataType::Bool => "bool",
            DataType::Str => "str",
        }
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
