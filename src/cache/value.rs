//! Cache Value Module
//!
//! Defines the payload types a cache table can store. The value type is
//! fixed per table at creation time: `String` tables use a TEXT column,
//! `Vec<u8>` tables use a BLOB column. Mixed use needs two tables.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::types::{FromSql, ToSql};

// == Cache Value Trait ==
/// Payload type stored in a cache table.
///
/// The engine stores its own metadata (the compaction sentinel) through
/// the same table as ordinary entries, which is what the text conversions
/// are for: a BLOB table holds the sentinel date as raw bytes.
pub trait CacheValue: ToSql + FromSql {
    /// SQL type of the value column in this table's schema.
    const COLUMN_TYPE: &'static str;

    /// Builds a value from plain text.
    fn from_text(text: String) -> Self;

    /// Interprets the value as text, if possible.
    fn as_text(&self) -> Option<String>;

    /// True when the payload is empty. Empty rows are treated as corrupt
    /// and deleted on read.
    fn is_empty_value(&self) -> bool;
}

impl CacheValue for String {
    const COLUMN_TYPE: &'static str = "TEXT";

    fn from_text(text: String) -> Self {
        text
    }

    fn as_text(&self) -> Option<String> {
        Some(self.clone())
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl CacheValue for Vec<u8> {
    const COLUMN_TYPE: &'static str = "BLOB";

    fn from_text(text: String) -> Self {
        text.into_bytes()
    }

    fn as_text(&self) -> Option<String> {
        String::from_utf8(self.clone()).ok()
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as i64
}
