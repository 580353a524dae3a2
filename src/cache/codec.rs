//! Array Codec Module
//!
//! Joins an ordered list of strings into a single cache value and splits
//! it back, using a reserved separator character that ordinary text is not
//! expected to contain.

use crate::error::{CacheError, Result};

/// Reserved separator used to join array items into one stored value.
pub const ARRAY_SEPARATOR: char = '\u{1}';

// == Join ==
/// Joins an ordered list of strings into a single string suitable for
/// storage under one cache key.
///
/// Items containing [`ARRAY_SEPARATOR`] are rejected: joining them would
/// make [`split_array`] return a different list than the one stored.
pub fn join_array<S: AsRef<str>>(items: &[S]) -> Result<String> {
    let mut joined = String::new();
    for (i, item) in items.iter().enumerate() {
        let item = item.as_ref();
        if item.contains(ARRAY_SEPARATOR) {
            return Err(CacheError::ReservedSeparator(item.to_string()));
        }
        if i > 0 {
            joined.push(ARRAY_SEPARATOR);
        }
        joined.push_str(item);
    }
    Ok(joined)
}

// == Split ==
/// Splits a joined value back into the ordered list of strings.
///
/// The empty string splits to the empty list, so the empty list
/// round-trips through [`join_array`]. A list of exactly one empty string
/// also joins to `""` and therefore comes back as the empty list.
pub fn split_array(joined: &str) -> Vec<String> {
    if joined.is_empty() {
        return Vec::new();
    }
    joined.split(ARRAY_SEPARATOR).map(String::from).collect()
}
