//! SQLite-backed key/value storage: one row per key in `kv_store`.

use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::storage::KeyValueStorage;
use chrono::Local;
use rusqlite::{OptionalExtension, params};
use std::sync::{Mutex, MutexGuard};

pub struct SqliteStorage {
    pool: Mutex<DbPool>,
}

impl SqliteStorage {
    /// Open (or create) the database at `path` and run pending migrations.
    pub fn open(path: &str) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        init_db(&pool.conn)?;
        Ok(Self {
            pool: Mutex::new(pool),
        })
    }

    pub fn in_memory() -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        init_db(&pool.conn)?;
        Ok(Self {
            pool: Mutex::new(pool),
        })
    }

    /// Run `func` against the underlying connection (activity log, reports).
    pub fn with_conn<F, T>(&self, func: F) -> AppResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> AppResult<T>,
    {
        let pool = self.lock()?;
        func(&pool.conn)
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, DbPool>> {
        self.pool
            .lock()
            .map_err(|_| AppError::Storage("sqlite connection lock poisoned".into()))
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let pool = self.lock()?;
        let mut stmt = pool
            .conn
            .prepare_cached("SELECT value FROM kv_store WHERE key = ?1")?;
        let value = stmt
            .query_row([key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        let pool = self.lock()?;
        let now = Local::now().to_rfc3339();
        pool.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        let pool = self.lock()?;
        pool.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
        Ok(())
    }
}
