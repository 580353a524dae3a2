//! Configuration Module
//!
//! Construction-time options for the cache engine. Every value is passed
//! explicitly at construction; nothing is read from process-wide state at
//! run time.

use std::env;
use std::path::PathBuf;

/// Cache engine configuration.
///
/// All fields have sensible defaults via [`Default`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding the storage file, created if absent
    pub cache_path: PathBuf,
    /// Logical table name the engine instance binds to
    pub table_name: String,
    /// Grace period in milliseconds added on top of TTL before a row is
    /// eagerly purged at startup
    pub tbd_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_path: env::temp_dir().join("hdc"),
            table_name: "cache".to_string(),
            tbd_ms: 60_000,
        }
    }
}

impl CacheConfig {
    /// Creates a configuration rooted at the given directory, keeping the
    /// default table name and grace period.
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
            ..Self::default()
        }
    }
}
