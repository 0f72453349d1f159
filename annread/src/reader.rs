//! Read entry points and options

use std::path::Path;
use std::sync::Arc;

use annread_core::{retain_handle, EncodingSet, SlotSpec};
use tracing::{debug, info};

use crate::diagnostics::Diagnostics;
use crate::dispatch::open_container;
use crate::error::Result;
use crate::materialize::materialize;
use crate::record::CompositeRecord;
use crate::slots::{resolve_slots, Resolution};
use crate::store::Container;

/// Options for a partial read
///
/// ```
/// use annread::{EncodingType, ReadOptions};
///
/// let options = ReadOptions::new()
///     .with_backed(true)
///     .with_force_sparse_types(EncodingType::DenseArray.into());
/// assert!(options.backed);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReadOptions {
    /// Hand out lazy handles for sparse slots and keep the container open
    pub backed: bool,
    /// Encodings converted to compressed sparse rows after reading
    pub force_sparse_types: EncodingSet,
    /// Slots to read; `None` reads every top-level child
    pub slots: Option<SlotSpec>,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backed(mut self, backed: bool) -> Self {
        self.backed = backed;
        self
    }

    pub fn with_force_sparse_types(mut self, types: EncodingSet) -> Self {
        self.force_sparse_types = types;
        self
    }

    /// Set the forced encodings from a tag list such as `"array,csc_matrix"`
    pub fn with_force_sparse_tags(mut self, tags: &str) -> Self {
        self.force_sparse_types = EncodingSet::parse_list(tags);
        self
    }

    pub fn with_slots(mut self, slots: SlotSpec) -> Self {
        self.slots = Some(slots);
        self
    }

    /// Add one slot to the specification
    pub fn with_slot(mut self, name: &str, path: &str) -> Result<Self> {
        self.slots.get_or_insert_with(SlotSpec::new).insert(name, path)?;
        Ok(self)
    }

    /// Load options from a JSON document
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Read the container at `path`
///
/// Single-file containers are closed before returning unless `backed` is
/// set. Directory stores stay attached to the record. The container is
/// closed on every error path and whenever nothing was read.
pub fn read<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<CompositeRecord> {
    let opened = open_container(path)?;
    let mut record = match read_partial(&opened.container, options) {
        Ok(record) => record,
        Err(err) => {
            // The read error is the one worth reporting.
            let _ = opened.container.close();
            return Err(err);
        }
    };

    // An empty record holds no handles that could need the container.
    if !record.is_empty() && retain_handle(opened.format, options.backed) {
        record.attach_container(opened.container);
    } else {
        opened.container.close()?;
    }
    Ok(record)
}

/// Read from a container that is already open
///
/// With `backed` set the record keeps a reference to the container.
pub fn read_partial(
    container: &Arc<dyn Container>,
    options: &ReadOptions,
) -> Result<CompositeRecord> {
    let mut diagnostics = Diagnostics::new();
    let slots = match resolve_slots(container.as_ref(), options.slots.as_ref(), &mut diagnostics)? {
        Resolution::Empty => return Ok(CompositeRecord::empty()),
        Resolution::Slots(slots) => slots,
    };

    if options.backed {
        info!(path = %container.location().display(), "reading in backed mode");
    }

    let mut outcomes = Vec::with_capacity(slots.len());
    for slot in &slots {
        outcomes.push((slot.name.clone(), materialize(container, slot, options)?));
    }
    debug!(slots = outcomes.len(), missing = diagnostics.len(), "assembled record");

    let mut record = CompositeRecord::assemble(outcomes, diagnostics)?;
    if options.backed {
        record.attach_container(Arc::clone(container));
    }
    Ok(record)
}
