//! Integration Tests for the Cache Engine
//!
//! Exercises behavior across engine reconstruction: persistence of fresh
//! entries, the eager startup purge and the compaction sentinel.

use std::thread::sleep;
use std::time::Duration;

use diskcache::cache::LAST_VACUUM_KEY;
use diskcache::{join_array, split_array, CacheConfig, CacheStore};
use tempfile::TempDir;

// == Helper Functions ==

fn config_for(dir: &TempDir) -> CacheConfig {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "diskcache=debug".into()),
        )
        .try_init();
    CacheConfig::new(dir.path())
}

// == Persistence Tests ==

#[test]
fn test_entries_survive_restart() {
    let dir = TempDir::new().unwrap();

    let store = CacheStore::<String>::open(config_for(&dir)).unwrap();
    store.set("key1", &"value1".to_string(), Some(60_000)).unwrap();
    store.destroy().unwrap();

    let reopened = CacheStore::<String>::open(config_for(&dir)).unwrap();
    assert_eq!(reopened.get("key1").unwrap().as_deref(), Some("value1"));
}

#[test]
fn test_startup_purge_removes_stale_rows_without_get() {
    let dir = TempDir::new().unwrap();
    let config = CacheConfig {
        tbd_ms: 10,
        ..config_for(&dir)
    };

    let store = CacheStore::<String>::open(config.clone()).unwrap();
    store.set("stale", &"value".to_string(), Some(10)).unwrap();
    // Sentinel plus the stale row
    assert_eq!(store.len().unwrap(), 2);
    store.destroy().unwrap();

    sleep(Duration::from_millis(50));

    // Reconstruction alone reclaims the row; no read is involved
    let reopened = CacheStore::<String>::open(config).unwrap();
    assert_eq!(reopened.len().unwrap(), 1);
    assert_eq!(reopened.get("stale").unwrap(), None);
}

#[test]
fn test_startup_purge_spares_fresh_rows() {
    let dir = TempDir::new().unwrap();

    let store = CacheStore::<String>::open(config_for(&dir)).unwrap();
    store.set("fresh", &"value".to_string(), Some(60_000)).unwrap();
    store.destroy().unwrap();

    let reopened = CacheStore::<String>::open(config_for(&dir)).unwrap();
    assert_eq!(reopened.get("fresh").unwrap().as_deref(), Some("value"));
}

#[test]
fn test_vacuum_sentinel_survives_restart() {
    let dir = TempDir::new().unwrap();

    // First construction over an empty file always compacts once and
    // records the date it did so
    let store = CacheStore::<String>::open(config_for(&dir)).unwrap();
    let stamp = store.get(LAST_VACUUM_KEY).unwrap().expect("sentinel written");
    store.destroy().unwrap();

    let reopened = CacheStore::<String>::open(config_for(&dir)).unwrap();
    assert_eq!(reopened.get(LAST_VACUUM_KEY).unwrap(), Some(stamp));
}

#[test]
fn test_binary_table_survives_restart() {
    let dir = TempDir::new().unwrap();
    let config = CacheConfig {
        table_name: "artifacts".to_string(),
        ..config_for(&dir)
    };

    let payload: Vec<u8> = vec![0xde, 0xad, 0xbe, 0xef];
    let store = CacheStore::<Vec<u8>>::open(config.clone()).unwrap();
    store.set("blob", &payload, Some(60_000)).unwrap();
    store.destroy().unwrap();

    let reopened = CacheStore::<Vec<u8>>::open(config).unwrap();
    assert_eq!(reopened.get("blob").unwrap(), Some(payload));
}

// == Multi-Table Tests ==

#[test]
fn test_tables_are_independent_keyspaces() {
    let dir = TempDir::new().unwrap();

    let first = CacheStore::<String>::open(config_for(&dir)).unwrap();
    let second = CacheStore::<String>::open(CacheConfig {
        table_name: "second".to_string(),
        ..config_for(&dir)
    })
    .unwrap();

    first.set("shared", &"from_first".to_string(), None).unwrap();
    second.set("shared", &"from_second".to_string(), None).unwrap();

    assert_eq!(first.get("shared").unwrap().as_deref(), Some("from_first"));
    assert_eq!(second.get("shared").unwrap().as_deref(), Some("from_second"));

    first.del("shared").unwrap();
    assert_eq!(second.get("shared").unwrap().as_deref(), Some("from_second"));
}

#[test]
fn test_delete_table_by_name() {
    let dir = TempDir::new().unwrap();

    let scratch = CacheStore::<String>::open(CacheConfig {
        table_name: "scratch".to_string(),
        ..config_for(&dir)
    })
    .unwrap();
    scratch.set("k", &"v".to_string(), None).unwrap();
    scratch.destroy().unwrap();

    let store = CacheStore::<String>::open(config_for(&dir)).unwrap();
    store.delete_table("scratch").unwrap();

    // Reopening the dropped table starts from an empty keyspace
    let reopened = CacheStore::<String>::open(CacheConfig {
        table_name: "scratch".to_string(),
        ..config_for(&dir)
    })
    .unwrap();
    assert_eq!(reopened.get("k").unwrap(), None);
}

// == Array Codec Tests ==

#[test]
fn test_array_round_trip_through_store() {
    let dir = TempDir::new().unwrap();
    let store = CacheStore::<String>::open(config_for(&dir)).unwrap();

    let items = vec!["first".to_string(), "second".to_string(), "third".to_string()];
    let joined = join_array(&items).unwrap();
    store.set("list", &joined, Some(60_000)).unwrap();

    let stored = store.get("list").unwrap().expect("list present");
    assert_eq!(split_array(&stored), items);
}
