//! Per-slot materialization

use std::sync::Arc;

use annread_core::{select_strategy, ResolvedSlot, Strategy};
use tracing::debug;

use crate::backed::{BackedSparse, SparseHandle};
use crate::decode::read_elem_as;
use crate::error::{Error, Result};
use crate::inspect::encoding_of;
use crate::reader::ReadOptions;
use crate::sparse::CompressedMatrix;
use crate::store::Container;
use crate::value::Value;

/// Turn one resolved slot into a value
///
/// Absent slots yield `Ok(None)` without touching the container.
pub fn materialize(
    container: &Arc<dyn Container>,
    slot: &ResolvedSlot,
    options: &ReadOptions,
) -> Result<Option<Value>> {
    if !slot.present {
        return Ok(None);
    }

    let encoding = encoding_of(container.as_ref(), &slot.path)?;
    let strategy = select_strategy(encoding.kind, options.backed, options.force_sparse_types);
    debug!(slot = %slot.name, path = %slot.path, encoding = %encoding.kind, ?strategy, "read slot");

    let value = match strategy {
        Strategy::BackedSparse => Value::Handle(SparseHandle::Backed(BackedSparse::open(
            Arc::clone(container),
            &slot.path,
            encoding.kind,
        )?)),
        Strategy::ForceSparse { wrap } => {
            let value = read_elem_as(container.as_ref(), &slot.path, encoding.kind)?;
            let csr = into_csr(value, &slot.path)?;
            if wrap {
                Value::Handle(SparseHandle::InMemory(csr))
            } else {
                Value::Sparse(csr)
            }
        }
        Strategy::Generic => read_elem_as(container.as_ref(), &slot.path, encoding.kind)?,
    };
    Ok(Some(value))
}

fn into_csr(value: Value, path: &str) -> Result<CompressedMatrix> {
    let relabel = |err: Error| match err {
        Error::Conversion { reason, .. } => Error::conversion(path, reason),
        other => other,
    };
    match value {
        Value::Array(dense) => CompressedMatrix::from_dense(&dense).map_err(relabel),
        Value::Scalar(scalar) => {
            CompressedMatrix::from_dense(&scalar.into_dense()).map_err(relabel)
        }
        Value::Sparse(matrix) => Ok(matrix.into_csr()),
        Value::Handle(handle) => Ok(handle.to_memory()?.into_csr()),
        other => Err(Error::conversion(
            path,
            format!("a {} has no sparse form", other.kind_name()),
        )),
    }
}
