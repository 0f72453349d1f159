//! Element decoders
//!
//! One decoder per encoding. Groups recurse through [`read_elem`], so a
//! mapping or table is read together with everything below it.

use std::collections::BTreeMap;

use annread_core::EncodingType;

use crate::error::{Error, Result};
use crate::inspect::encoding_of;
use crate::sparse::{CompressedMatrix, SparseFormat};
use crate::store::{attr_bool, attr_str, attr_strings, attr_usizes, join_path, Container, NodeKind};
use crate::value::{Categorical, DataFrame, DenseArray, Nullable, Scalar, Value};

const INDEX_ATTR: &str = "_index";
const COLUMN_ORDER_ATTR: &str = "column-order";
const LEGACY_CATEGORIES: &str = "__categories";

/// Read the element at `path` with the decoder its encoding selects
pub fn read_elem(container: &dyn Container, path: &str) -> Result<Value> {
    let encoding = encoding_of(container, path)?;
    read_elem_as(container, path, encoding.kind)
}

/// Read the element at `path` as the given encoding
pub fn read_elem_as(container: &dyn Container, path: &str, kind: EncodingType) -> Result<Value> {
    let value = match kind {
        EncodingType::DenseArray | EncodingType::StringArray => {
            Value::Array(read_dense(container, path)?)
        }
        EncodingType::CsrMatrix | EncodingType::CscMatrix => {
            Value::Sparse(read_sparse(container, path, kind)?)
        }
        EncodingType::DataFrame => Value::DataFrame(read_dataframe(container, path)?),
        EncodingType::Mapping => Value::Mapping(read_mapping(container, path)?),
        EncodingType::Scalar => Value::Scalar(Scalar::from_single(
            container.read_array(path)?,
            path,
        )?),
        EncodingType::Categorical => Value::Categorical(read_categorical(container, path)?),
        EncodingType::Nullable => Value::Nullable(read_nullable(container, path)?),
        EncodingType::Generic => match container.node_kind(path)? {
            NodeKind::Array => Value::Array(read_dense(container, path)?),
            NodeKind::Group => Value::Mapping(read_mapping(container, path)?),
        },
    };
    Ok(value)
}

fn read_dense(container: &dyn Container, path: &str) -> Result<DenseArray> {
    let info = container.array_info(path)?;
    let data = container.read_array(path)?;
    DenseArray::new(info.shape, data).map_err(|e| Error::decode(path, e.to_string()))
}

/// Shape of a stored sparse group
///
/// Older writers used `h5sparse_shape` instead of `shape`.
pub(crate) fn sparse_shape(container: &dyn Container, path: &str) -> Result<(usize, usize)> {
    let attrs = container.attributes(path)?;
    let shape = attr_usizes(&attrs, "shape").or_else(|| attr_usizes(&attrs, "h5sparse_shape"));
    match shape.as_deref() {
        Some([rows, cols]) => Ok((*rows, *cols)),
        Some(other) => Err(Error::decode(
            path,
            format!("sparse shape has {} dimensions", other.len()),
        )),
        None => Err(Error::decode(path, "sparse group has no shape attribute")),
    }
}

/// Paths of the three arrays of a compressed sparse group
pub(crate) struct SparseParts {
    pub data: String,
    pub indices: String,
    pub indptr: String,
}

impl SparseParts {
    pub fn of(path: &str) -> Self {
        SparseParts {
            data: join_path(path, "data"),
            indices: join_path(path, "indices"),
            indptr: join_path(path, "indptr"),
        }
    }
}

fn sparse_format(path: &str, kind: EncodingType) -> Result<SparseFormat> {
    SparseFormat::from_encoding(kind)
        .ok_or_else(|| Error::decode(path, format!("`{kind}` is not a sparse encoding")))
}

fn read_sparse(
    container: &dyn Container,
    path: &str,
    kind: EncodingType,
) -> Result<CompressedMatrix> {
    let format = sparse_format(path, kind)?;
    let shape = sparse_shape(container, path)?;
    let parts = SparseParts::of(path);
    let data = container.read_array(&parts.data)?;
    let indices = container
        .read_array(&parts.indices)?
        .into_usize_vec(&parts.indices)?;
    let indptr = container
        .read_array(&parts.indptr)?
        .into_usize_vec(&parts.indptr)?;
    CompressedMatrix::new(format, shape, indptr, indices, data)
        .map_err(|e| Error::decode(path, e.to_string()))
}

fn read_mapping(container: &dyn Container, path: &str) -> Result<BTreeMap<String, Value>> {
    container
        .children(path)?
        .into_iter()
        .map(|name| {
            let child = join_path(path, &name);
            read_elem(container, &child).map(|value| (name, value))
        })
        .collect()
}

fn read_dataframe(container: &dyn Container, path: &str) -> Result<DataFrame> {
    let attrs = container.attributes(path)?;
    let index_name = attr_str(&attrs, INDEX_ATTR).unwrap_or(INDEX_ATTR).to_string();

    let index_path = join_path(path, &index_name);
    let index = if container.contains(&index_path)? {
        match read_elem(container, &index_path)? {
            Value::Array(array) => array.data().to_strings(),
            Value::Categorical(categorical) => categorical.labels(),
            other => {
                return Err(Error::decode(
                    &index_path,
                    format!("index cannot be a {}", other.kind_name()),
                ))
            }
        }
    } else {
        Vec::new()
    };

    let order = match attr_strings(&attrs, COLUMN_ORDER_ATTR) {
        Some(order) => order,
        None => container
            .children(path)?
            .into_iter()
            .filter(|name| *name != index_name && name != LEGACY_CATEGORIES)
            .collect(),
    };

    let mut frame = DataFrame::new(index_name, index);
    for name in order {
        let value = read_elem(container, &join_path(path, &name))?;
        frame = frame.with_column(name, value);
    }
    Ok(frame)
}

fn read_categorical(container: &dyn Container, path: &str) -> Result<Categorical> {
    let attrs = container.attributes(path)?;
    let codes_path = join_path(path, "codes");
    let codes = container
        .read_array(&codes_path)?
        .into_i64_vec(&codes_path)?;
    let categories = container.read_array(&join_path(path, "categories"))?;
    Ok(Categorical {
        codes,
        categories,
        ordered: attr_bool(&attrs, "ordered").unwrap_or(false),
    })
}

fn read_nullable(container: &dyn Container, path: &str) -> Result<Nullable> {
    let values = container.read_array(&join_path(path, "values"))?;
    let mask_path = join_path(path, "mask");
    let mask = container.read_array(&mask_path)?.into_bool_vec(&mask_path)?;
    if mask.len() != values.len() {
        return Err(Error::decode(path, "mask and values differ in length"));
    }
    Ok(Nullable { values, mask })
}
