//! Cache Module
//!
//! Provides persistent key-value caching with TTL expiration, eager purge
//! at startup and weekly storage compaction.

mod codec;
mod store;
mod value;


// Re-export public types
pub use codec::{join_array, split_array, ARRAY_SEPARATOR};
pub use store::CacheStore;
pub use value::CacheValue;

// == Public Constants ==
/// Name of the storage file inside the cache directory
pub const DB_FILE_NAME: &str = "cache.db";

/// Default TTL in milliseconds for entries stored without an explicit TTL
pub const DEFAULT_TTL_MS: u64 = 60_000;

/// Reserved key holding the date of the last storage compaction
pub const LAST_VACUUM_KEY: &str = "__LAST_VACUUM";

/// TTL for the compaction sentinel, long enough to never expire in practice
pub const VACUUM_SENTINEL_TTL_MS: u64 = 10 * 365 * 24 * 60 * 60 * 1000; // ~10 years
