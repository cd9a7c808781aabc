//! User settings: document model, write-through store and edit parsing.

pub mod edit;
pub mod model;
pub mod store;

pub use edit::{SettingKey, apply_setting};
pub use model::{ScaleType, SettingsDocument, WebhookHistoryEntry};
pub use store::{Loaded, SettingsStore, SettingsUpdate};
