//! Element types that can back a compressed matrix

use crate::dtype::DataType;

/// Scalar type stored in a matrix value buffer
///
/// Conversions through `f64` let generic code build zeros and compare
/// values without knowing the concrete type.
pub trait MatrixElement: Copy + PartialEq + Sized {
    fn data_type() -> DataType;

    fn from_f64(value: f64) -> Self;

    fn to_f64(self) -> f64;

    fn zero() -> Self {
        Self::from_f64(0.0)
    }

    /// Whether the value is an implicit zero in sparse form
    fn is_zero(self) -> bool {
        self.to_f64() == 0.0
    }
}

macro_rules! impl_numeric_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl MatrixElement for $ty {
                fn data_type() -> DataType {
                    DataType::$dtype
                }

                fn from_f64(value: f64) -> Self {
                    value as $ty
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_numeric_element!(
    f32 => F32,
    f64 => F64,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
);

impl MatrixElement for bool {
    fn data_type() -> DataType {
        DataType::Bool
    }

    fn from_f64(value: f64) -> Self {
        value != 0.0
    }

    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    fn is_zero(self) -> bool {
        !self
    }
}
