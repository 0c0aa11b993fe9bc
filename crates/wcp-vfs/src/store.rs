//! Durable key/value mirror of workspace state.
//!
//! Key layout:
//!
//! ```text
//! registry/workspaces      JSON array of workspace names, in creation order
//! registry/active          name of the active workspace
//! meta/<name>              JSON WorkspaceMeta (framework, tabs, positions, program id)
//! items/<name><path>       file bytes; directories are stored with an empty value
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("value at {0} is not valid UTF-8")]
    Utf8(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Path → bytes storage backing the registry.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Removing a missing key succeeds.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// All keys starting with `prefix`, sorted.
    fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    fn delete_prefix(&self, prefix: &str) -> Result<(), StoreError> {
        for key in self.list_prefix(prefix)? {
            self.delete(&key)?;
        }
        Ok(())
    }
}

pub mod keys {
    use crate::path::VfsPath;

    pub const WORKSPACES: &str = "registry/workspaces";
    pub const ACTIVE: &str = "registry/active";

    pub fn meta(workspace: &str) -> String {
        format!("meta/{workspace}")
    }

    pub fn items_prefix(workspace: &str) -> String {
        format!("items/{workspace}/")
    }

    pub fn item(workspace: &str, path: &VfsPath) -> String {
        format!("items/{workspace}{path}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory store
// ─────────────────────────────────────────────────────────────────────────────

/// Store kept in process memory. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    map: BTreeMap<String, Vec<u8>>,
    fail_writes: bool,
    writes: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put`/`delete` fail, to exercise degraded persistence.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    /// Number of successful `put` and `delete` calls so far.
    pub fn write_count(&self) -> u64 {
        self.inner.lock().writes
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.inner
            .lock()
            .map
            .get(key)
            .and_then(|v| String::from_utf8(v.clone()).ok())
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().map.keys().cloned().collect()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.inner.lock().map.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.fail_writes {
            return Err(StoreError::Unavailable(format!("write to {key} rejected")));
        }
        inner.map.insert(key.to_string(), value.to_vec());
        inner.writes += 1;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.fail_writes {
            return Err(StoreError::Unavailable(format!("delete of {key} rejected")));
        }
        inner.map.remove(key);
        inner.writes += 1;
        Ok(())
    }

    fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .inner
            .lock()
            .map
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite store (rusqlite is sync; callers already serialize access)
// ─────────────────────────────────────────────────────────────────────────────

pub struct SqliteStore {
    conn: Mutex<rusqlite::Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = rusqlite::Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Mutex::new(rusqlite::Connection::open_in_memory()?),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<(), StoreError> {
        self.conn.lock().execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key         TEXT PRIMARY KEY,
                value       BLOB NOT NULL,
                updated_at  INTEGER NOT NULL
            );
            ",
        )?;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(rusqlite::params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, now_ms() as i64],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .lock()
            .execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
        Ok(())
    }

    fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )?;
        let rows = stmt.query_map(rusqlite::params![prefix], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn delete_prefix(&self, prefix: &str) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "DELETE FROM kv WHERE substr(key, 1, length(?1)) = ?1",
            rusqlite::params![prefix],
        )?;
        Ok(())
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
