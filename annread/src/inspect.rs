//! Encoding inspection

use annread_core::{EncodingType, ENCODING_TYPE_KEY, ENCODING_VERSION_KEY};

use crate::error::Result;
use crate::store::{attr_str, Container};

/// Declared encoding of one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    pub kind: EncodingType,
    /// Tag as written, `None` when the attribute is absent
    pub tag: Option<String>,
    pub version: Option<String>,
}

/// Read the encoding attributes of the element at `path`
///
/// A missing tag is not an error; the element is then read by node kind.
pub fn encoding_of(container: &dyn Container, path: &str) -> Result<Encoding> {
    let attrs = container.attributes(path)?;
    let tag = attr_str(&attrs, ENCODING_TYPE_KEY).map(str::to_string);
    let version = attr_str(&attrs, ENCODING_VERSION_KEY).map(str::to_string);
    let kind = tag
        .as_deref()
        .map_or(EncodingType::Generic, EncodingType::from_tag);
    Ok(Encoding { kind, tag, version })
}
