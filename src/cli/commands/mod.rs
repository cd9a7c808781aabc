pub mod calendar;
pub mod config;
pub mod feedback;
pub mod init;
pub mod log;
pub mod settings;
pub mod webhook;

use crate::config::Config;
use crate::errors::AppResult;
use crate::settings::SettingsStore;
use crate::storage::SqliteStorage;
use crate::ui::messages::warning;
use std::sync::Arc;

/// Open the storage database named in `cfg` and load the settings.
pub fn open_store(cfg: &Config) -> AppResult<SettingsStore<SqliteStorage>> {
    let storage = Arc::new(SqliteStorage::open(&cfg.database)?);
    let store = SettingsStore::open(storage)?;
    let loaded = store.load();
    if !loaded.ready {
        warning("Settings could not be read; working with defaults for this run.");
    }
    Ok(store)
}

/// Wait for pending writes and tell the user when they did not land.
pub fn finish_writes(store: &SettingsStore<SqliteStorage>) {
    store.flush();
    if store.write_failures() > 0 {
        warning("Settings could not be saved; the change only applies to this run.");
    }
}

/// Append a line to the activity log; failures are only traced.
pub fn audit(store: &SettingsStore<SqliteStorage>, operation: &str, target: &str, message: &str) {
    let res = store.storage().with_conn(|conn| {
        crate::db::log::ptlog_quiet(conn, operation, target, message);
        Ok(())
    });
    if let Err(e) = res {
        tracing::warn!(error = %e, "activity log unavailable");
    }
}
