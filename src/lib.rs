//! Disk Cache - a persistent key-value cache backed by SQLite
//!
//! Cached entries survive process restarts and expire by TTL: stale rows
//! are deleted lazily on read, purged eagerly at startup, and the storage
//! file is compacted at most once per calendar week.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{join_array, split_array, CacheStore, CacheValue};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
