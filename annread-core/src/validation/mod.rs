//! Structural validation with no I/O dependencies
//!
//! Everything here is arithmetic on lengths, offsets and path text, so it
//! can be checked before any value is handed to a caller.

pub mod bounds;
pub mod compressed;
pub mod parsing;
pub mod path;

pub use bounds::{checked_element_count, validate_range};
pub use compressed::{validate_compressed, validate_indptr};
pub use parsing::parse_range;
pub use path::{normalize_slot_path, split_parent};
