//! Per-slot materialization policy
//!
//! The decision table is kept free of I/O so it can be checked in
//! isolation. Precedence, top to bottom:
//!
//! | encoding sparse | backed | in force set | strategy                        |
//! |-----------------|--------|--------------|---------------------------------|
//! | yes             | yes    | any          | `BackedSparse`                  |
//! | any             | any    | yes          | `ForceSparse { wrap: backed }`  |
//! | otherwise       |        |              | `Generic`                       |

use crate::encoding::{EncodingSet, EncodingType};
use crate::format::FileFormat;

/// How a present slot is turned into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Lazy handle over the stored sparse group, no bulk read
    BackedSparse,
    /// Generic read, then conversion to compressed sparse rows
    ///
    /// With `wrap` set the converted matrix is handed out as a handle.
    ForceSparse { wrap: bool },
    /// Generic read with the decoder for the element's encoding
    Generic,
}

/// Pick the strategy for one slot
pub const fn select_strategy(
    encoding: EncodingType,
    backed: bool,
    force_sparse: EncodingSet,
) -> Strategy {
    if encoding.is_sparse() && backed {
        return Strategy::BackedSparse;
    }
    if force_sparse.contains(encoding) {
        return Strategy::ForceSparse { wrap: backed };
    }
    Strategy::Generic
}

/// Whether the container handle must outlive the read call
///
/// Backed reads hand out lazy handles that need the container. Directory
/// stores hold no exclusive resource and are always kept.
pub const fn retain_handle(format: FileFormat, backed: bool) -> bool {
    backed || !format.requires_explicit_close()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backed_sparse_wins() {
        let force = EncodingSet::sparse();
        assert_eq!(
            select_strategy(EncodingType::CsrMatrix, true, force),
            Strategy::BackedSparse
        );
        assert_eq!(
            select_strategy(EncodingType::CscMatrix, true, EncodingSet::empty()),
            Strategy::BackedSparse
        );
    }

    #[test]
    fn test_force_sparse() {
        let force = EncodingSet::from(EncodingType::DenseArray);
        assert_eq!(
            select_strategy(EncodingType::DenseArray, false, force),
            Strategy::ForceSparse { wrap: false }
        );
        assert_eq!(
            select_strategy(EncodingType::DenseArray, true, force),
            Strategy::ForceSparse { wrap: true }
        );
        assert_eq!(
            select_strategy(EncodingType::CsrMatrix, false, EncodingSet::sparse()),
            Strategy::ForceSparse { wrap: false }
        );
    }

    #[test]
    fn test_generic_fallback() {
        assert_eq!(
            select_strategy(EncodingType::CsrMatrix, false, EncodingSet::empty()),
            Strategy::Generic
        );
        assert_eq!(
            select_strategy(EncodingType::DataFrame, true, EncodingSet::empty()),
            Strategy::Generic
        );
    }

    #[test]
    fn test_retain_handle() {
        assert!(!retain_handle(FileFormat::H5ad, false));
        assert!(retain_handle(FileFormat::H5ad, true));
        assert!(retain_handle(FileFormat::Zarr, false));
        assert!(retain_handle(FileFormat::Zarr, true));
    }
}
