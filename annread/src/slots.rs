//! Slot resolution against an open container

use annread_core::{ResolvedSlot, SlotSpec};
use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::store::Container;

/// Outcome of resolving a slot specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Container has no top-level children; nothing is read
    Empty,
    /// Requested slots in order, each marked present or absent
    Slots(Vec<ResolvedSlot>),
}

/// Check each requested slot for presence
///
/// Without a specification, or with an empty one, every top-level child is
/// requested under its own name. Absent slots are kept in the result and
/// reported once each through `diagnostics`.
pub fn resolve_slots(
    container: &dyn Container,
    spec: Option<&SlotSpec>,
    diagnostics: &mut Diagnostics,
) -> Result<Resolution> {
    let children = container.children("")?;
    if children.is_empty() {
        debug!(path = %container.location().display(), "container is empty");
        return Ok(Resolution::Empty);
    }

    let identity;
    let spec = match spec {
        Some(spec) if !spec.is_empty() => spec,
        _ => {
            identity = SlotSpec::identity(&children);
            &identity
        }
    };

    let mut slots = Vec::with_capacity(spec.len());
    for (name, path) in spec.iter() {
        let present = container.contains(path)?;
        if !present {
            diagnostics.missing_slot(name, path);
        }
        slots.push(ResolvedSlot::new(name, path, present));
    }
    Ok(Resolution::Slots(slots))
}
