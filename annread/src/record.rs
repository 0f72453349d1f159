//! Composite record assembly
//!
//! The record mirrors the AnnData layout: a fixed set of well-known slots
//! plus an overflow map for anything else the caller asked for. A slot that
//! was requested but could not be found is kept as an explicit null.

use std::collections::BTreeMap;
use std::sync::Arc;

use annread_core::CoreError;

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::store::Container;
use crate::value::Value;

/// Slots a quality-control consumer needs before it can start
pub const QC_REQUIRED_SLOTS: [&str; 3] = ["X", "obs", "var"];

#[derive(Debug, Default)]
pub struct CompositeRecord {
    pub x: Option<Value>,
    pub obs: Option<Value>,
    pub var: Option<Value>,
    pub obsm: Option<Value>,
    pub varm: Option<Value>,
    pub obsp: Option<Value>,
    pub varp: Option<Value>,
    pub layers: Option<Value>,
    pub uns: Option<Value>,
    pub raw: Option<Value>,
    /// Slots outside the well-known set
    pub extra: BTreeMap<String, Value>,
    requested: Vec<String>,
    diagnostics: Diagnostics,
    container: Option<Arc<dyn Container>>,
}

impl CompositeRecord {
    /// Record with nothing requested
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pack per-slot outcomes in request order
    ///
    /// `None` outcomes become explicit nulls. A repeated name is rejected.
    pub fn assemble<I>(outcomes: I, diagnostics: Diagnostics) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Option<Value>)>,
    {
        let mut record = CompositeRecord {
            diagnostics,
            ..Self::default()
        };
        for (name, value) in outcomes {
            if record.is_requested(&name) {
                return Err(Error::Core(CoreError::DuplicateSlot));
            }
            if let Some(value) = value {
                match record.well_known_mut(&name) {
                    Some(slot) => *slot = Some(value),
                    None => {
                        record.extra.insert(name.clone(), value);
                    }
                }
            }
            record.requested.push(name);
        }
        Ok(record)
    }

    fn well_known_mut(&mut self, name: &str) -> Option<&mut Option<Value>> {
        let slot = match name {
            "X" => &mut self.x,
            "obs" => &mut self.obs,
            "var" => &mut self.var,
            "obsm" => &mut self.obsm,
            "varm" => &mut self.varm,
            "obsp" => &mut self.obsp,
            "varp" => &mut self.varp,
            "layers" => &mut self.layers,
            "uns" => &mut self.uns,
            "raw" => &mut self.raw,
            _ => return None,
        };
        Some(slot)
    }

    fn well_known(&self, name: &str) -> Option<&Option<Value>> {
        let slot = match name {
            "X" => &self.x,
            "obs" => &self.obs,
            "var" => &self.var,
            "obsm" => &self.obsm,
            "varm" => &self.varm,
            "obsp" => &self.obsp,
            "varp" => &self.varp,
            "layers" => &self.layers,
            "uns" => &self.uns,
            "raw" => &self.raw,
            _ => return None,
        };
        Some(slot)
    }

    /// Materialized value of a slot
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.well_known(name) {
            Some(slot) => slot.as_ref(),
            None => self.extra.get(name),
        }
    }

    pub fn is_requested(&self, name: &str) -> bool {
        self.requested.iter().any(|n| n == name)
    }

    /// Requested but absent from the container
    pub fn is_null(&self, name: &str) -> bool {
        self.is_requested(name) && self.get(name).is_none()
    }

    /// Requested slot names in request order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.requested.iter().map(String::as_str)
    }

    /// Requested slots that hold no value
    pub fn missing(&self) -> Vec<&str> {
        self.names().filter(|name| self.get(name).is_none()).collect()
    }

    /// Number of requested slots, nulls included
    pub fn len(&self) -> usize {
        self.requested.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requested.is_empty()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Container kept alive for backed handles, if retained
    pub fn container(&self) -> Option<&Arc<dyn Container>> {
        self.container.as_ref()
    }

    pub(crate) fn attach_container(&mut self, container: Arc<dyn Container>) {
        self.container = Some(container);
    }

    /// Fail unless every named slot holds a value
    pub fn require(&self, names: &[&str]) -> Result<()> {
        let missing: Vec<String> = names
            .iter()
            .filter(|name| self.get(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingSlots(missing))
        }
    }

    /// Close the retained container, if any
    ///
    /// Backed handles taken from this record stop working afterwards.
    pub fn close(&mut self) -> Result<()> {
        match self.container.take() {
            Some(container) => container.close(),
            None => Ok(()),
        }
    }
}
