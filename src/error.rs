//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
///
/// A missing or expired key is not an error; reads report absence as
/// `Ok(None)`. The variants here cover construction failures, storage
/// engine failures and array codec misuse. The engine never retries on
/// its own, so every failure surfaces to the caller as-is.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache directory could not be created
    #[error("Failed to create cache directory {}", .path.display())]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// Underlying storage engine failure
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// An array item contains the reserved separator character
    #[error("Item contains the reserved separator: {0:?}")]
    ReservedSeparator(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
