//! Encoding vocabulary for stored elements
//!
//! Every element in an AnnData container declares its logical type through
//! the `encoding-type` attribute. This module maps the open set of on-disk
//! tags onto a closed enum, so dispatch on an element's encoding is an
//! exhaustive `match` rather than string comparison.

/// Attribute carrying the encoding tag of an element
pub const ENCODING_TYPE_KEY: &str = "encoding-type";

/// Attribute carrying the encoding version of an element
pub const ENCODING_VERSION_KEY: &str = "encoding-version";

/// Logical type of a stored element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum EncodingType {
    /// N-dimensional numeric array
    DenseArray = 0,
    /// Compressed sparse row group
    CsrMatrix = 1,
    /// Compressed sparse column group
    CscMatrix = 2,
    /// Column-oriented table with an index
    DataFrame = 3,
    /// Group of named children
    Mapping = 4,
    /// Single number, string or boolean
    Scalar = 5,
    /// One-dimensional array of strings
    StringArray = 6,
    /// Codes plus categories
    Categorical = 7,
    /// Values plus a missing-value mask
    Nullable = 8,
    /// Tag absent or not recognized
    Generic = 9,
}

impl EncodingType {
    pub const ALL: [EncodingType; 10] = [
        EncodingType::DenseArray,
        EncodingType::CsrMatrix,
        EncodingType::CscMatrix,
        EncodingType::DataFrame,
        EncodingType::Mapping,
        EncodingType::Scalar,
        EncodingType::StringArray,
        EncodingType::Categorical,
        EncodingType::Nullable,
        EncodingType::Generic,
    ];

    /// Map an on-disk tag onto the closed vocabulary
    ///
    /// Unknown tags map to [`EncodingType::Generic`], which is read by node
    /// kind alone.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "array" | "dense_array" => EncodingType::DenseArray,
            "csr_matrix" => EncodingType::CsrMatrix,
            "csc_matrix" => EncodingType::CscMatrix,
            "dataframe" => EncodingType::DataFrame,
            "dict" | "mapping" | "anndata" | "raw" => EncodingType::Mapping,
            "string" | "numeric-scalar" | "scalar" => EncodingType::Scalar,
            "string-array" => EncodingType::StringArray,
            "categorical" => EncodingType::Categorical,
            "nullable-integer" | "nullable-boolean" | "nullable-string-array" => {
                EncodingType::Nullable
            }
            _ => EncodingType::Generic,
        }
    }

    /// Canonical tag for this encoding
    pub const fn as_tag(&self) -> &'static str {
        match self {
            EncodingType::DenseArray => "array",
            EncodingType::CsrMatrix => "csr_matrix",
            EncodingType::CscMatrix => "csc_matrix",
            EncodingType::DataFrame => "dataframe",
            EncodingType::Mapping => "dict",
            EncodingType::Scalar => "scalar",
            EncodingType::StringArray => "string-array",
            EncodingType::Categorical => "categorical",
            EncodingType::Nullable => "nullable",
            EncodingType::Generic => "generic",
        }
    }

    pub const fn is_sparse(&self) -> bool {
        matches!(self, EncodingType::CsrMatrix | EncodingType::CscMatrix)
    }

    const fn bit(self) -> u16 {
        1 << (self as u8)
    }
}

impl core::fmt::Display for EncodingType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.as_tag())
    }
}

impl core::str::FromStr for EncodingType {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(EncodingType::from_tag(s))
    }
}

/// Set of encodings, stored as a bitmask
///
/// Used for the `force_sparse_types` policy: elements whose encoding is in
/// the set are converted to compressed sparse row form after reading.
/// [`EncodingType::Generic`] is never a member, so an unknown tag in a
/// forced list matches no element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EncodingSet {
    bits: u16,
}

impl EncodingSet {
    pub const fn empty() -> Self {
        EncodingSet { bits: 0 }
    }

    /// Both compressed sparse encodings
    pub const fn sparse() -> Self {
        EncodingSet::empty()
            .with(EncodingType::CsrMatrix)
            .with(EncodingType::CscMatrix)
    }

    pub const fn with(self, encoding: EncodingType) -> Self {
        if matches!(encoding, EncodingType::Generic) {
            return self;
        }
        EncodingSet {
            bits: self.bits | encoding.bit(),
        }
    }

    /// Add an encoding, returning whether it was newly inserted
    pub fn insert(&mut self, encoding: EncodingType) -> bool {
        let had = self.contains(encoding);
        *self = self.with(encoding);
        !had && self.contains(encoding)
    }

    pub fn remove(&mut self, encoding: EncodingType) -> bool {
        let had = self.contains(encoding);
        self.bits &= !encoding.bit();
        had
    }

    pub const fn contains(&self, encoding: EncodingType) -> bool {
        self.bits & encoding.bit() != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub const fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Members in declaration order
    pub fn iter(&self) -> impl Iterator<Item = EncodingType> + '_ {
        EncodingType::ALL
            .iter()
            .copied()
            .filter(move |e| self.contains(*e))
    }

    /// Parse a comma or whitespace separated list of tags
    ///
    /// A single tag is a one-element list. Empty items and tags outside the
    /// vocabulary are skipped.
    pub fn parse_list(list: &str) -> Self {
        list.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|item| !item.is_empty())
            .map(EncodingType::from_tag)
            .collect()
    }
}

impl From<EncodingType> for EncodingSet {
    fn from(encoding: EncodingType) -> Self {
        EncodingSet::empty().with(encoding)
    }
}

impl FromIterator<EncodingType> for EncodingSet {
    fn from_iter<I: IntoIterator<Item = EncodingType>>(iter: I) -> Self {
        let mut set = EncodingSet::empty();
        set.extend(iter);
        set
    }
}

impl Extend<EncodingType> for EncodingSet {
    fn extend<I: IntoIterator<Item = EncodingType>>(&mut self, iter: I) {
        for encoding in iter {
            self.insert(encoding);
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::{EncodingSet, EncodingType};
    use core::fmt;
    use serde::de::{self, SeqAccess, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for EncodingType {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.as_tag())
        }
    }

    impl<'de> Deserialize<'de> for EncodingType {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            struct TagVisitor;

            impl Visitor<'_> for TagVisitor {
                type Value = EncodingType;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("an encoding tag")
                }

                fn visit_str<E: de::Error>(self, v: &str) -> Result<EncodingType, E> {
                    Ok(EncodingType::from_tag(v))
                }
            }

            deserializer.deserialize_str(TagVisitor)
        }
    }

    impl Serialize for EncodingSet {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(self.iter())
        }
    }

    // Accepts either one tag or a list of tags.
    impl<'de> Deserialize<'de> for EncodingSet {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            struct SetVisitor;

            impl<'de> Visitor<'de> for SetVisitor {
                type Value = EncodingSet;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("an encoding tag or a list of encoding tags")
                }

                fn visit_str<E: de::Error>(self, v: &str) -> Result<EncodingSet, E> {
                    Ok(EncodingSet::parse_list(v))
                }

                fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<EncodingSet, A::Error> {
                    let mut set = EncodingSet::empty();
                    while let Some(encoding) = seq.next_element::<EncodingType>()? {
                        set.insert(encoding);
                    }
                    Ok(set)
                }

                fn visit_unit<E: de::Error>(self) -> Result<EncodingSet, E> {
                    Ok(EncodingSet::empty())
                }
            }

            deserializer.deserialize_any(SetVisitor)
        }
    }
}
