//! Parsing of textual row ranges

use crate::CoreError;
use core::ops::Range;

/// Parse a half-open range written as `start:end`, `start..end` or `start-end`
///
/// A missing end (`"10:"`) extends to `len`.
pub fn parse_range(text: &str, len: usize) -> Result<Range<usize>, CoreError> {
    let text = text.trim();
    let (start, end) = ["..", ":", "-"]
        .iter()
        .find_map(|sep| text.split_once(sep))
        .ok_or(CoreError::InvalidRange)?;

    let start = if start.is_empty() {
        0
    } else {
        start.parse::<usize>().map_err(|_| CoreError::InvalidRange)?
    };
    let end = if end.is_empty() {
        len
    } else {
        end.parse::<usize>().map_err(|_| CoreError::InvalidRange)?
    };

    let range = start..end;
    super::validate_range(&range, len)?;
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_separators() {
        assert_eq!(parse_range("0:3", 10), Ok(0..3));
        assert_eq!(parse_range("2..5", 10), Ok(2..5));
        assert_eq!(parse_range("4-6", 10), Ok(4..6));
        assert_eq!(parse_range(" 1:2 ", 10), Ok(1..2));
    }

    #[test]
    fn test_parse_range_open_ends() {
        assert_eq!(parse_range("7:", 10), Ok(7..10));
        assert_eq!(parse_range(":4", 10), Ok(0..4));
    }

    #[test]
    fn test_parse_range_invalid() {
        assert_eq!(parse_range("", 10), Err(CoreError::InvalidRange));
        assert_eq!(parse_range("5", 10), Err(CoreError::InvalidRange));
        assert_eq!(parse_range("a:b", 10), Err(CoreError::InvalidRange));
        assert_eq!(parse_range("6:2", 10), Err(CoreError::InvalidRange));
        assert_eq!(parse_range("0:11", 10), Err(CoreError::InvalidRange));
    }
}
