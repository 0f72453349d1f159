//! Materialized values
//!
//! Each stored encoding decodes into one variant of [`Value`]. Numeric
//! buffers keep their stored element type in [`ArrayData`]; conversions
//! through `f64` are available for comparisons and summaries.

use std::collections::BTreeMap;
use std::ops::Range;

use annread_core::{checked_element_count, DataType};

use crate::backed::SparseHandle;
use crate::error::{Error, Result};
use crate::sparse::CompressedMatrix;

/// Typed one-dimensional buffer read from a stored array
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

/// Apply one expression to the inner vector of any variant
macro_rules! with_buffer {
    ($data:expr, $buf:ident => $body:expr) => {
        match $data {
            ArrayData::F32($buf) => $body,
            ArrayData::F64($buf) => $body,
            ArrayData::I32($buf) => $body,
            ArrayData::I64($buf) => $body,
            ArrayData::U32($buf) => $body,
            ArrayData::U64($buf) => $body,
            ArrayData::Bool($buf) => $body,
            ArrayData::Str($buf) => $body,
        }
    };
}

/// Same as `with_buffer!` but rebuilds the same variant from the result
macro_rules! map_buffer {
    ($data:expr, $buf:ident => $body:expr) => {
        match $data {
            ArrayData::F32($buf) => ArrayData::F32($body),
            ArrayData::F64($buf) => ArrayData::F64($body),
            ArrayData::I32($buf) => ArrayData::I32($body),
            ArrayData::I64($buf) => ArrayData::I64($body),
            ArrayData::U32($buf) => ArrayData::U32($body),
            ArrayData::U64($buf) => ArrayData::U64($body),
            ArrayData::Bool($buf) => ArrayData::Bool($body),
            ArrayData::Str($buf) => ArrayData::Str($body),
        }
    };
}

impl ArrayData {
    /// Empty buffer of the given type
    pub fn empty(dtype: DataType) -> Self {
        match dtype {
            DataType::F32 => ArrayData::F32(Vec::new()),
            DataType::F64 => ArrayData::F64(Vec::new()),
            DataType::I32 => ArrayData::I32(Vec::new()),
            DataType::I64 => ArrayData::I64(Vec::new()),
            DataType::U32 => ArrayData::U32(Vec::new()),
            DataType::U64 => ArrayData::U64(Vec::new()),
            DataType::Bool => ArrayData::Bool(Vec::new()),
            DataType::Str => ArrayData::Str(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        with_buffer!(self, buf => buf.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DataType {
        match self {
            ArrayData::F32(_) => DataType::F32,
            ArrayData::F64(_) => DataType::F64,
            ArrayData::I32(_) => DataType::I32,
            ArrayData::I64(_) => DataType::I64,
            ArrayData::U32(_) => DataType::U32,
            ArrayData::U64(_) => DataType::U64,
            ArrayData::Bool(_) => DataType::Bool,
            ArrayData::Str(_) => DataType::Str,
        }
    }

    /// Element at `index` as `f64`; `None` for strings or out of range
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            ArrayData::F32(v) => v.get(index).map(|&x| f64::from(x)),
            ArrayData::F64(v) => v.get(index).copied(),
            ArrayData::I32(v) => v.get(index).map(|&x| f64::from(x)),
            ArrayData::I64(v) => v.get(index).map(|&x| x as f64),
            ArrayData::U32(v) => v.get(index).map(|&x| f64::from(x)),
            ArrayData::U64(v) => v.get(index).map(|&x| x as f64),
            ArrayData::Bool(v) => v.get(index).map(|&x| if x { 1.0 } else { 0.0 }),
            ArrayData::Str(_) => None,
        }
    }

    /// Whole buffer as `f64`; `None` for strings
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        if self.dtype() == DataType::Str {
            return None;
        }
        (0..self.len()).map(|i| self.get_f64(i)).collect()
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            ArrayData::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Render every element as text
    pub fn to_strings(&self) -> Vec<String> {
        with_buffer!(self, buf => buf.iter().map(|x| x.to_string()).collect())
    }

    /// Copy of a contiguous sub-range
    pub fn slice(&self, range: Range<usize>) -> ArrayData {
        map_buffer!(self, buf => buf[range].to_vec())
    }

    /// Copy of the elements at the given positions, in that order
    pub fn gather(&self, positions: &[usize]) -> ArrayData {
        map_buffer!(self, buf => positions.iter().map(|&p| buf[p].clone()).collect())
    }

    /// Interpret as non-negative offsets or indices
    pub(crate) fn into_usize_vec(self, path: &str) -> Result<Vec<usize>> {
        fn convert<T>(values: Vec<T>, path: &str) -> Result<Vec<usize>>
        where
            T: TryInto<usize> + Copy + std::fmt::Display,
        {
            values
                .into_iter()
                .map(|v| {
                    v.try_into()
                        .map_err(|_| Error::decode(path, format!("invalid offset {v}")))
                })
                .collect()
        }

        match self {
            ArrayData::I32(v) => convert(v, path),
            ArrayData::I64(v) => convert(v, path),
            ArrayData::U32(v) => convert(v, path),
            ArrayData::U64(v) => convert(v, path),
            other => Err(Error::decode(
                path,
                format!("expected an integer array, found {}", other.dtype()),
            )),
        }
    }

    /// Interpret as signed codes, e.g. categorical codes
    pub(crate) fn into_i64_vec(self, path: &str) -> Result<Vec<i64>> {
        match self {
            ArrayData::I32(v) => Ok(v.into_iter().map(i64::from).collect()),
            ArrayData::I64(v) => Ok(v),
            ArrayData::U32(v) => Ok(v.into_iter().map(i64::from).collect()),
            ArrayData::U64(v) => v
                .into_iter()
                .map(|x| i64::try_from(x).map_err(|_| Error::decode(path, "code out of range")))
                .collect(),
            other => Err(Error::decode(
                path,
                format!("expected integer codes, found {}", other.dtype()),
            )),
        }
    }

    pub(crate) fn into_bool_vec(self, path: &str) -> Result<Vec<bool>> {
        match self {
            ArrayData::Bool(v) => Ok(v),
            other => match other.to_f64_vec() {
                Some(v) => Ok(v.into_iter().map(|x| x != 0.0).collect()),
                None => Err(Error::decode(path, "expected a boolean mask")),
            },
        }
    }
}

/// Dense N-dimensional array in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct DenseArray {
    shape: Vec<usize>,
    data: ArrayData,
}

impl DenseArray {
    pub fn new(shape: Vec<usize>, data: ArrayData) -> Result<Self> {
        let expected = checked_element_count(&shape)?;
        if expected != data.len() {
            return Err(annread_core::CoreError::InvalidShape.into());
        }
        Ok(DenseArray { shape, data })
    }

    /// One-dimensional array over the whole buffer
    pub fn vector(data: ArrayData) -> Self {
        DenseArray {
            shape: vec![data.len()],
            data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn dtype(&self) -> DataType {
        self.data.dtype()
    }

    pub fn into_data(self) -> ArrayData {
        self.data
    }

    /// Dimensions when viewed as a matrix
    ///
    /// A vector is one row and a scalar is a 1x1 matrix. Arrays with more
    /// than two dimensions have no matrix view.
    pub fn matrix_dims(&self) -> Option<(usize, usize)> {
        match self.shape.as_slice() {
            [] => Some((1, 1)),
            [n] => Some((1, *n)),
            [rows, cols] => Some((*rows, *cols)),
            _ => None,
        }
    }
}

/// Single stored value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Scalar {
    /// Take the only element of a buffer
    pub(crate) fn from_single(data: ArrayData, path: &str) -> Result<Self> {
        if data.len() != 1 {
            return Err(Error::decode(
                path,
                format!("scalar holds {} elements", data.len()),
            ));
        }
        let scalar = match data {
            ArrayData::F32(v) => Scalar::Float(f64::from(v[0])),
            ArrayData::F64(v) => Scalar::Float(v[0]),
            ArrayData::I32(v) => Scalar::Int(i64::from(v[0])),
            ArrayData::I64(v) => Scalar::Int(v[0]),
            ArrayData::U32(v) => Scalar::UInt(u64::from(v[0])),
            ArrayData::U64(v) => Scalar::UInt(v[0]),
            ArrayData::Bool(v) => Scalar::Bool(v[0]),
            ArrayData::Str(mut v) => Scalar::Str(v.swap_remove(0)),
        };
        Ok(scalar)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::UInt(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            Scalar::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Scalar::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Zero-dimensional array holding this value
    pub fn into_dense(self) -> DenseArray {
        let data = match self {
            Scalar::Int(v) => ArrayData::I64(vec![v]),
            Scalar::UInt(v) => ArrayData::U64(vec![v]),
            Scalar::Float(v) => ArrayData::F64(vec![v]),
            Scalar::Bool(v) => ArrayData::Bool(vec![v]),
            Scalar::Str(v) => ArrayData::Str(vec![v]),
        };
        DenseArray {
            shape: Vec::new(),
            data,
        }
    }
}

/// Integer codes into a table of categories; negative codes are missing
#[derive(Debug, Clone, PartialEq)]
pub struct Categorical {
    pub codes: Vec<i64>,
    pub categories: ArrayData,
    pub ordered: bool,
}

impl Categorical {
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Category position for row `index`, `None` when missing
    pub fn category_of(&self, index: usize) -> Option<usize> {
        let code = *self.codes.get(index)?;
        usize::try_from(code)
            .ok()
            .filter(|&c| c < self.categories.len())
    }

    /// Category labels per row, empty for missing codes
    pub fn labels(&self) -> Vec<String> {
        let names = self.categories.to_strings();
        (0..self.codes.len())
            .map(|i| {
                self.category_of(i)
                    .map(|c| names[c].clone())
                    .unwrap_or_default()
            })
            .collect()
    }
}

/// Values with a mask; `true` in the mask marks a missing value
#[derive(Debug, Clone, PartialEq)]
pub struct Nullable {
    pub values: ArrayData,
    pub mask: Vec<bool>,
}

impl Nullable {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_null(&self, index: usize) -> bool {
        self.mask.get(index).copied().unwrap_or(false)
    }
}

/// Column-oriented table with a string index
#[derive(Debug)]
pub struct DataFrame {
    pub(crate) index_name: String,
    pub(crate) index: Vec<String>,
    pub(crate) columns: Vec<(String, Value)>,
}

impl DataFrame {
    pub fn new(index_name: impl Into<String>, index: Vec<String>) -> Self {
        DataFrame {
            index_name: index_name.into(),
            index,
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, value: Value) -> Self {
        self.columns.push((name.into(), value));
        self
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn column(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Row labels taken from a string column, falling back to the index
    ///
    /// Gene tables often carry readable symbols in a column such as
    /// `feature_name` while the index holds accession ids.
    pub fn names_from(&self, column: &str) -> Vec<String> {
        match self.column(column) {
            Some(Value::Array(array)) if array.dtype() == DataType::Str => {
                array.data().to_strings()
            }
            Some(Value::Categorical(cat)) if cat.categories.dtype() == DataType::Str => {
                cat.labels()
            }
            _ => self.index.clone(),
        }
    }
}

/// A materialized slot
#[derive(Debug)]
pub enum Value {
    Array(DenseArray),
    Sparse(CompressedMatrix),
    Handle(SparseHandle),
    DataFrame(DataFrame),
    Mapping(BTreeMap<String, Value>),
    Scalar(Scalar),
    Categorical(Categorical),
    Nullable(Nullable),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Array(_) => "array",
            Value::Sparse(_) => "sparse",
            Value::Handle(h) if h.is_backed() => "backed sparse",
            Value::Handle(_) => "sparse handle",
            Value::DataFrame(_) => "dataframe",
            Value::Mapping(_) => "mapping",
            Value::Scalar(_) => "scalar",
            Value::Categorical(_) => "categorical",
            Value::Nullable(_) => "nullable",
        }
    }

    /// Matrix dimensions for array-like values
    pub fn shape(&self) -> Option<(usize, usize)> {
        match self {
            Value::Array(a) => a.matrix_dims(),
            Value::Sparse(m) => Some(m.shape()),
            Value::Handle(h) => Some(h.shape()),
            Value::DataFrame(df) => Some((df.len(), df.columns.len())),
            Value::Categorical(c) => Some((1, c.len())),
            Value::Nullable(n) => Some((1, n.len())),
            Value::Mapping(_) | Value::Scalar(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&DenseArray> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_sparse(&self) -> Option<&CompressedMatrix> {
        match self {
            Value::Sparse(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<&SparseHandle> {
        match self {
            Value::Handle(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_dataframe(&self) -> Option<&DataFrame> {
        match self {
            Value::DataFrame(df) => Some(df),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&Categorical> {
        match self {
            Value::Categorical(c) => Some(c),
            _ => None,
        }
    }
}
