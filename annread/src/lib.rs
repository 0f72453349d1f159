//! annread - partial, encoding-aware reads of AnnData containers
//!
//! Reads selected slots from `.h5ad` single files and `.zarr` directory
//! stores. Each stored element declares its logical type through an
//! `encoding-type` attribute; the reader inspects that tag and decides per
//! slot whether to load the element, convert it to compressed sparse rows,
//! or hand out a lazy handle that reads row ranges on demand.
//!
//! ## Architecture
//!
//! - **annread-core**: encoding vocabulary, slot specifications, the
//!   materialization decision table and layout validation (no I/O)
//! - **annread**: storage backends, decoders, sparse handles and the read
//!   pipeline
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use annread::{read, ReadOptions, SlotSpec};
//!
//! fn example() -> annread::Result<()> {
//!     let slots = SlotSpec::from_pairs([("X", "layers/counts"), ("obs", "obs")])?;
//!     let options = ReadOptions::new().with_backed(true).with_slots(slots);
//!     let record = read("pbmc3k.zarr", &options)?;
//!
//!     if let Some(handle) = record.x.as_ref().and_then(|x| x.as_handle()) {
//!         let first_rows = handle.read_rows(0..100)?;
//!         println!("{} stored values in the first 100 rows", first_rows.nnz());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `zarr` (default): directory stores through `zarrs`
//! - `h5ad`: single-file containers through the HDF5 bindings; needs the
//!   HDF5 system library
//! - `serde` (default): serializable options and slot specifications

pub use annread_core::{
    // Policy
    retain_handle, select_strategy, Strategy,
    // Vocabulary
    DataType, EncodingSet, EncodingType, FileFormat, ENCODING_TYPE_KEY, ENCODING_VERSION_KEY,
    // Slots
    ResolvedSlot, SlotEntry, SlotSpec,
    // Matrix traits
    MatrixElement, MatrixOperations, SparseMatrix,
    // Errors and validation
    parse_range, CoreError,
};

pub mod backed;
pub mod decode;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod inspect;
pub mod materialize;
pub mod reader;
pub mod record;
pub mod slots;
pub mod sparse;
pub mod store;
pub mod value;

pub use backed::{BackedSparse, SparseHandle};
pub use decode::{read_elem, read_elem_as};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use dispatch::{dataset_path, open_container, OpenedContainer};
pub use error::{Error, Result};
pub use inspect::{encoding_of, Encoding};
pub use materialize::materialize;
pub use reader::{read, read_partial, ReadOptions};
pub use record::{CompositeRecord, QC_REQUIRED_SLOTS};
pub use slots::{resolve_slots, Resolution};
pub use sparse::{CompressedMatrix, SparseFormat};
pub use store::{ArrayInfo, Attributes, Container, NodeKind};
pub use value::{ArrayData, Categorical, DataFrame, DenseArray, Nullable, Scalar, Value};

#[cfg(feature = "h5ad")]
pub use store::H5adStore;
#[cfg(feature = "zarr")]
pub use store::ZarrStore;
