//! Key/value persistence seam.
//!
//! The settings document lives under a single fixed key. Backends store
//! opaque strings; callers own (de)serialization.

pub mod sqlite;

pub use sqlite::SqliteStorage;

use crate::errors::AppResult;

/// Key under which the settings document is stored.
pub const SETTINGS_KEY: &str = "PIXEL_TRACKER_SETTINGS";

pub trait KeyValueStorage: Send + Sync + 'static {
    /// `Ok(None)` when the key has never been written.
    fn get_item(&self, key: &str) -> AppResult<Option<String>>;

    /// Overwrites any previous value.
    fn set_item(&self, key: &str, value: &str) -> AppResult<()>;

    fn remove_item(&self, key: &str) -> AppResult<()>;
}
