//! Cache Store Module
//!
//! Main cache engine storing entries in an embedded SQLite database so
//! that cached results outlive a single process invocation.

use std::marker::PhantomData;
use std::path::PathBuf;
use std::time::Instant;

use chrono::{Datelike, NaiveDate, Utc, Weekday};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::cache::value::now_ms;
use crate::cache::{
    CacheValue, DB_FILE_NAME, DEFAULT_TTL_MS, LAST_VACUUM_KEY, VACUUM_SENTINEL_TTL_MS,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Persistent cache engine bound to one table inside one SQLite file.
///
/// The value type is fixed per table: `CacheStore<String>` stores TEXT
/// values, `CacheStore<Vec<u8>>` stores BLOB values. Several tables may
/// coexist in the same storage file, each opened through its own store.
///
/// Every operation is a single atomic statement against the storage
/// engine, which serializes access to the file. Cross-process access is
/// bounded by SQLite's own WAL locking; the store adds no coordination of
/// its own, no retries and no timeouts.
#[derive(Debug)]
pub struct CacheStore<V: CacheValue = String> {
    /// Open storage handle, writer of record for the bound table
    conn: Connection,
    /// Location of the storage file
    db_path: PathBuf,
    /// Bound table name
    table: String,
    /// Grace period in ms past expiry before the startup purge reclaims a row
    tbd_ms: u64,
    // SQL for the four per-key statements, compiled at construction and
    // reused through the connection's statement cache.
    get_sql: String,
    set_sql: String,
    update_ttl_sql: String,
    delete_sql: String,
    _value: PhantomData<V>,
}

impl<V: CacheValue> CacheStore<V> {
    // == Constructor ==
    /// Opens (or creates) the cache under `config.cache_path` and binds it
    /// to `config.table_name`.
    ///
    /// Construction creates the directory if needed, opens the storage
    /// file, configures it for write-ahead logging with relaxed fsync,
    /// ensures the table and its expiry index exist, purges rows stale for
    /// longer than the grace period, and compacts the storage file at most
    /// once per calendar week.
    ///
    /// # Errors
    /// Fails if the directory cannot be created, the storage file cannot
    /// be opened, or any schema statement fails. A failed construction
    /// leaves no usable engine.
    pub fn open(config: CacheConfig) -> Result<Self> {
        let started = Instant::now();

        std::fs::create_dir_all(&config.cache_path).map_err(|source| CacheError::CreateDir {
            path: config.cache_path.clone(),
            source,
        })?;

        let db_path = config.cache_path.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path)?;

        // WAL keeps readers unblocked while writing; NORMAL sync is safe
        // under WAL; temp tables stay off disk.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.pragma_query(None, "optimize", |_| Ok(()))?;

        let qtable = quote_ident(&config.table_name);
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {qtable} (
                 key TEXT PRIMARY KEY,
                 value {column},
                 expiry INTEGER NOT NULL
             );
             CREATE INDEX IF NOT EXISTS {index} ON {qtable} (expiry);",
            qtable = qtable,
            column = V::COLUMN_TYPE,
            index = quote_ident(&format!("{}_expiry_idx", config.table_name)),
        ))?;

        let store = Self {
            conn,
            db_path,
            get_sql: format!("SELECT value, expiry FROM {qtable} WHERE key = ?1"),
            set_sql: format!(
                "INSERT INTO {qtable} (key, value, expiry) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, expiry = excluded.expiry"
            ),
            update_ttl_sql: format!("UPDATE {qtable} SET expiry = ?2 WHERE key = ?1"),
            delete_sql: format!("DELETE FROM {qtable} WHERE key = ?1"),
            table: config.table_name,
            tbd_ms: config.tbd_ms,
            _value: PhantomData,
        };

        store.compile_statements()?;
        store.purge_stale()?;
        store.maybe_vacuum(Utc::now().date_naive())?;

        info!(
            "Cache table '{}' ready at {} in {}ms",
            store.table,
            store.db_path.display(),
            started.elapsed().as_millis()
        );

        Ok(store)
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` for missing keys, for expired entries and for rows
    /// with a NULL or empty payload. Stale and empty rows are deleted as a
    /// side effect of the read, so a `get` can write.
    pub fn get(&self, key: &str) -> Result<Option<V>> {
        let mut stmt = self.conn.prepare_cached(&self.get_sql)?;
        let row: Option<(Option<V>, i64)> = stmt
            .query_row(params![key], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let (value, expiry) = match row {
            Some(found) => found,
            None => return Ok(None),
        };

        if expiry < now_ms() {
            self.del(key)?;
            return Ok(None);
        }

        match value {
            Some(value) if !value.is_empty_value() => Ok(Some(value)),
            // NULL or empty payload: treat the row as corrupt and drop it
            _ => {
                self.del(key)?;
                Ok(None)
            }
        }
    }

    // == Set ==
    /// Stores a key-value pair with an optional TTL in milliseconds
    /// (default 60 seconds).
    ///
    /// Upsert semantics: an existing key has both its value and expiry
    /// overwritten in one atomic statement.
    pub fn set(&self, key: &str, value: &V, ttl_ms: Option<u64>) -> Result<()> {
        let expiry = now_ms() + ttl_ms.unwrap_or(DEFAULT_TTL_MS) as i64;
        let mut stmt = self.conn.prepare_cached(&self.set_sql)?;
        stmt.execute(params![key, value, expiry])?;
        Ok(())
    }

    // == Update TTL ==
    /// Extends the expiry of an existing key without touching its value.
    ///
    /// A missing key is a silent no-op: the statement affects zero rows.
    pub fn update_ttl(&self, key: &str, ttl_ms: u64) -> Result<()> {
        let expiry = now_ms() + ttl_ms as i64;
        let mut stmt = self.conn.prepare_cached(&self.update_ttl_sql)?;
        stmt.execute(params![key, expiry])?;
        Ok(())
    }

    // == Delete ==
    /// Removes an entry by key. Idempotent: deleting a missing key
    /// succeeds and changes nothing.
    pub fn del(&self, key: &str) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(&self.delete_sql)?;
        stmt.execute(params![key])?;
        Ok(())
    }

    // == Delete Table ==
    /// Drops a table (not necessarily the bound one) from the same storage
    /// file. Idempotent.
    pub fn delete_table(&self, name: &str) -> Result<()> {
        self.conn
            .execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)))?;
        Ok(())
    }

    // == Destroy ==
    /// Closes the storage handle. Consumes the engine, so no further
    /// operations are possible on this instance.
    pub fn destroy(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| CacheError::Storage(err))
    }

    // == Length ==
    /// Returns the number of rows currently in the bound table, including
    /// entries that are expired but not yet reclaimed and the compaction
    /// sentinel.
    pub fn len(&self) -> Result<u64> {
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(&self.table)),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // == Is Empty ==
    /// Returns true if the bound table holds no rows at all.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Compiles the four per-key statements into the connection's
    /// statement cache so later operations reuse them without re-parsing.
    fn compile_statements(&self) -> Result<()> {
        for sql in [
            &self.get_sql,
            &self.set_sql,
            &self.update_ttl_sql,
            &self.delete_sql,
        ] {
            self.conn.prepare_cached(sql)?;
        }
        Ok(())
    }

    /// Deletes every row stale for longer than the grace period. Runs
    /// unconditionally at construction, without requiring a prior read.
    fn purge_stale(&self) -> Result<()> {
        let cutoff = now_ms() - self.tbd_ms as i64;
        let purged = self.conn.execute(
            &format!(
                "DELETE FROM {} WHERE expiry < ?1",
                quote_ident(&self.table)
            ),
            params![cutoff],
        )?;
        if purged > 0 {
            debug!("Purged {} stale entries from '{}'", purged, self.table);
        }
        Ok(())
    }

    /// Compacts the storage file at most once per calendar week.
    ///
    /// The date of the last compaction lives in the [`LAST_VACUUM_KEY`]
    /// sentinel row, stored through the ordinary `set` path with a TTL
    /// long enough to never expire. Compaction runs when the sentinel is
    /// absent or unreadable, or when the stored date differs from today
    /// and today is a Saturday. Dates use the UTC calendar so the weekly
    /// gate does not shift with local timezone or DST changes.
    ///
    /// `VACUUM` rewrites the whole file and blocks all concurrent access
    /// for its duration.
    fn maybe_vacuum(&self, today: NaiveDate) -> Result<bool> {
        let stamp = format!("{}-{}-{}", today.year(), today.month(), today.day());
        match self.get(LAST_VACUUM_KEY)?.and_then(|v| v.as_text()) {
            Some(last) if last == stamp => return Ok(false),
            Some(_) if today.weekday() != Weekday::Sat => return Ok(false),
            _ => {}
        }

        self.set(
            LAST_VACUUM_KEY,
            &V::from_text(stamp),
            Some(VACUUM_SENTINEL_TTL_MS),
        )?;
        self.conn.execute_batch("VACUUM")?;
        info!("Compacted cache storage at {}", self.db_path.display());
        Ok(true)
    }
}

// == Utility Functions ==
/// Quotes an identifier for interpolation into statements where SQLite
/// does not allow parameter binding (table and index names).
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
