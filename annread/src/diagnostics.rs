//! Advisory diagnostics collected during a read
//!
//! Non-fatal conditions are logged through `tracing` and also recorded
//! here, so callers can inspect them on the returned record.

use std::fmt;

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Requested slot path does not exist in the container
    MissingSlot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub slot: String,
    pub path: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::MissingSlot => write!(
                f,
                "cannot find `{}` for slot `{}`, slot left empty",
                self.path, self.slot
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a slot whose path is absent
    pub fn missing_slot(&mut self, slot: &str, path: &str) {
        let diagnostic = Diagnostic {
            kind: DiagnosticKind::MissingSlot,
            slot: slot.to_string(),
            path: path.to_string(),
        };
        warn!(slot, path, "{diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slot names reported missing, in report order
    pub fn missing_slots(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|d| d.kind == DiagnosticKind::MissingSlot)
            .map(|d| d.slot.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_slot_recorded() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());
        diagnostics.missing_slot("counts", "layers/counts");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.missing_slots().collect::<Vec<_>>(), vec!["counts"]);

        let message = diagnostics.iter().next().unwrap().to_string();
        assert!(message.contains("layers/counts"));
    }
}
