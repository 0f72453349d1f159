//! Slot specifications
//!
//! A slot specification maps output slot names to in-container paths. It
//! keeps insertion order so the assembled record lists slots the way the
//! caller asked for them.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashSet;

use crate::error::{CoreError, Result};
use crate::validation::normalize_slot_path;

/// One requested slot
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotEntry {
    pub name: String,
    pub path: String,
}

/// Ordered mapping from output slot name to in-container path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<SlotEntry>", into = "Vec<SlotEntry>")
)]
pub struct SlotSpec {
    entries: Vec<SlotEntry>,
}

impl SlotSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every name to the path of the same name
    ///
    /// Names are expected to be distinct, as top-level children of a
    /// container are. Repeats after the first are ignored.
    pub fn identity<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let entries = names
            .into_iter()
            .filter_map(|name| {
                let name = name.as_ref();
                seen.insert(name.to_string()).then(|| SlotEntry {
                    name: name.to_string(),
                    path: name.to_string(),
                })
            })
            .collect();
        SlotSpec { entries }
    }

    /// Build from (name, path) pairs, rejecting repeated names
    pub fn from_pairs<I, N, P>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for (name, path) in pairs {
            let entry = make_entry(name.into(), path.as_ref())?;
            if !seen.insert(entry.name.clone()) {
                return Err(CoreError::DuplicateSlot);
            }
            entries.push(entry);
        }
        Ok(SlotSpec { entries })
    }

    /// Append a slot; fails if the name is already present
    pub fn insert(&mut self, name: impl Into<String>, path: &str) -> Result<()> {
        let entry = make_entry(name.into(), path)?;
        if self.get(&entry.name).is_some() {
            return Err(CoreError::DuplicateSlot);
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Builder form of [`SlotSpec::insert`]
    pub fn with(mut self, name: impl Into<String>, path: &str) -> Result<Self> {
        self.insert(name, path)?;
        Ok(self)
    }

    /// Path requested for a slot name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.path.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.path.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn make_entry(name: String, path: &str) -> Result<SlotEntry> {
    if name.is_empty() {
        return Err(CoreError::InvalidSlotPath);
    }
    let path = normalize_slot_path(path)?.to_string();
    Ok(SlotEntry { name, path })
}

impl TryFrom<Vec<SlotEntry>> for SlotSpec {
    type Error = CoreError;

    fn try_from(entries: Vec<SlotEntry>) -> Result<Self> {
        SlotSpec::from_pairs(entries.into_iter().map(|entry| (entry.name, entry.path)))
    }
}

impl From<SlotSpec> for Vec<SlotEntry> {
    fn from(spec: SlotSpec) -> Self {
        spec.entries
    }
}

/// A slot after presence checking against an open container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSlot {
    pub name: String,
    pub path: String,
    pub present: bool,
}

impl ResolvedSlot {
    pub fn new(name: impl Into<String>, path: impl Into<String>, present: bool) -> Self {
        ResolvedSlot {
            name: name.into(),
            path: path.into(),
            present,
        }
    }
}
