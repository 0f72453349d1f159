#![no_std]

//! annread core - encoding vocabulary and read policy for AnnData containers
//!
//! This crate holds the pure pieces of a partial AnnData read: the
//! `encoding-type` vocabulary, container format detection by suffix, the
//! per-slot materialization decision table, slot specifications and
//! structural validation of compressed sparse arrays. It performs no I/O.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod dtype;
pub mod encoding;
pub mod error;
pub mod format;
pub mod policy;
#[cfg(feature = "alloc")]
pub mod slots;
pub mod traits;
pub mod validation;

pub use dtype::DataType;
pub use encoding::{EncodingSet, EncodingType, ENCODING_TYPE_KEY, ENCODING_VERSION_KEY};
pub use error::*;
pub use format::FileFormat;
pub use policy::{retain_handle, select_strategy, Strategy};
#[cfg(feature = "alloc")]
pub use slots::{ResolvedSlot, SlotEntry, SlotSpec};
pub use traits::*;
pub use validation::*;
