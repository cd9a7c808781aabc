use pixeltracker::errors::AppResult;
use pixeltracker::settings::{
    ScaleType, SettingsDocument, SettingsStore, SettingsUpdate, WebhookHistoryEntry,
};
use pixeltracker::storage::{KeyValueStorage, SETTINGS_KEY, SqliteStorage};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

mod common;
use common::MemoryStorage;

fn open(storage: &Arc<MemoryStorage>) -> SettingsStore<MemoryStorage> {
    SettingsStore::open(Arc::clone(storage)).expect("open store")
}

fn stored_json(storage: &MemoryStorage) -> Value {
    serde_json::from_str(&storage.peek(SETTINGS_KEY).expect("stored settings")).unwrap()
}

fn history_entry(url: &str) -> WebhookHistoryEntry {
    WebhookHistoryEntry {
        url: url.to_string(),
        date: "2025-03-01T09:30:00.000Z".into(),
        body: "{}".into(),
        status_code: Some(200),
        status_text: Some("OK".into()),
        is_error: false,
        error_message: None,
    }
}

#[test]
fn empty_storage_loads_defaults_with_new_device_id() {
    let storage = Arc::new(MemoryStorage::new());
    let store = open(&storage);
    assert!(!store.is_ready());

    let loaded = store.load();
    store.flush();

    assert!(loaded.ready);
    let id = loaded.settings.device_id.clone().expect("device id");
    assert!(!id.is_empty());
    assert_eq!(
        loaded.settings,
        SettingsDocument {
            device_id: Some(id.clone()),
            ..SettingsDocument::default()
        }
    );
    assert_eq!(storage.write_count(), 1);
    assert_eq!(stored_json(&storage)["deviceId"], id.as_str());
}

#[test]
fn partial_document_is_merged_over_defaults() {
    let storage = Arc::new(MemoryStorage::with_item(
        SETTINGS_KEY,
        r#"{"reminderEnabled": true}"#,
    ));
    let store = open(&storage);

    let loaded = store.load();
    store.flush();

    let doc = loaded.settings;
    assert!(doc.reminder_enabled);
    assert!(doc.has_device_id());
    assert_eq!(
        doc,
        SettingsDocument {
            device_id: doc.device_id.clone(),
            reminder_enabled: true,
            ..SettingsDocument::default()
        }
    );
    assert_eq!(storage.write_count(), 1);
    assert_eq!(stored_json(&storage)["reminderEnabled"], true);
    assert_eq!(stored_json(&storage)["reminderTime"], "18:00");
}

#[test]
fn missing_device_id_is_assigned_and_persisted_exactly_once() {
    let cases = [
        r#"{}"#,
        r#"{"deviceId": null}"#,
        r#"{"deviceId": "", "scaleType": "ColorBrew-PiYG"}"#,
        r#"{"passcodeEnabled": true, "passcode": "1234", "webhookUrl": "https://example.org"}"#,
    ];

    for case in cases {
        let storage = Arc::new(MemoryStorage::with_item(SETTINGS_KEY, case));
        let store = open(&storage);

        let loaded = store.load();
        store.flush();

        assert!(loaded.settings.has_device_id(), "case {case}");
        assert_eq!(storage.write_count(), 1, "case {case}");
        assert_eq!(
            stored_json(&storage)["deviceId"].as_str(),
            loaded.settings.device_id.as_deref(),
            "case {case}"
        );
    }
}

#[test]
fn loading_a_complete_document_is_idempotent() {
    let full = json!({
        "deviceId": "6f1c2a1e-6a2b-4f0e-9d55-0d7c1c7f1a10",
        "passcodeEnabled": false,
        "passcode": null,
        "webhookEnabled": true,
        "webhookUrl": "https://example.org/hook",
        "webhookHistory": [],
        "scaleType": "ColorBrew-PiYG",
        "reminderEnabled": true,
        "reminderTime": "21:15"
    });
    let storage = Arc::new(MemoryStorage::with_item(SETTINGS_KEY, &full.to_string()));

    let first = open(&storage).load();
    let second = open(&storage).load();

    assert_eq!(
        serde_json::to_string(&first.settings).unwrap(),
        serde_json::to_string(&second.settings).unwrap()
    );
    assert_eq!(first.settings.scale_type, ScaleType::PiYG);
    assert_eq!(storage.write_count(), 0);
}

/// Storage whose writes take a while, so several updates queue up.
#[derive(Default)]
struct SlowStorage {
    inner: MemoryStorage,
    completed: AtomicUsize,
}

impl KeyValueStorage for SlowStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        thread::sleep(Duration::from_millis(100));
        self.inner.set_item(key, value)?;
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        self.inner.remove_item(key)
    }
}

#[test]
fn mutators_see_latest_state_while_writes_are_pending() {
    let storage = Arc::new(SlowStorage::default());
    let store = SettingsStore::open(Arc::clone(&storage)).unwrap();
    store.load();
    store.flush();
    let baseline = storage.completed.load(Ordering::SeqCst);

    store.update(SettingsUpdate::Mutate(Box::new(|doc: &SettingsDocument| {
        let mut next = doc.clone();
        next.webhook_history.push(history_entry("https://a.example"));
        next
    })));
    store.update_with(|doc| {
        assert_eq!(doc.webhook_history.len(), 1);
        let mut next = doc.clone();
        next.webhook_history.push(history_entry("https://b.example"));
        next
    });

    // Neither write has landed yet.
    assert_eq!(storage.completed.load(Ordering::SeqCst), baseline);
    assert_eq!(store.settings().webhook_history.len(), 2);

    store.flush();
    assert_eq!(storage.completed.load(Ordering::SeqCst), baseline + 2);

    let stored: Value =
        serde_json::from_str(&storage.inner.peek(SETTINGS_KEY).unwrap()).unwrap();
    assert_eq!(stored["webhookHistory"].as_array().unwrap().len(), 2);
    assert_eq!(stored["webhookHistory"][1]["url"], "https://b.example");
}

#[test]
fn reset_restores_defaults_and_drops_device_id() {
    let storage = Arc::new(MemoryStorage::new());
    let store = open(&storage);
    let original_id = store.load().settings.device_id.unwrap();

    store.update_with(|doc| SettingsDocument {
        reminder_enabled: true,
        scale_type: ScaleType::PiYG,
        ..doc.clone()
    });
    let after_reset = store.reset();
    store.flush();

    assert_eq!(after_reset, SettingsDocument::default());
    assert_eq!(store.settings(), SettingsDocument::default());
    assert!(store.is_ready(), "ready latches once reached");
    assert_eq!(stored_json(&storage)["deviceId"], Value::Null);
    store.close();

    // A fresh load regenerates a different identifier.
    let reopened = open(&storage);
    let new_id = reopened.load().settings.device_id.unwrap();
    assert_ne!(new_id, original_id);
}

#[test]
fn failed_writes_keep_in_memory_state() {
    let storage = Arc::new(MemoryStorage::new());
    let store = open(&storage);
    store.load();
    store.flush();
    let before = storage.peek(SETTINGS_KEY).unwrap();

    storage.set_fail_writes(true);
    store.replace(SettingsDocument {
        reminder_time: "07:45".into(),
        ..store.settings()
    });
    store.flush();

    assert_eq!(store.settings().reminder_time, "07:45");
    assert_eq!(store.write_failures(), 1);
    assert_eq!(storage.peek(SETTINGS_KEY).unwrap(), before);
}

#[test]
fn read_failure_leaves_store_unready() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set_fail_reads(true);
    let store = open(&storage);

    let loaded = store.load();
    store.flush();

    assert!(!loaded.ready);
    assert_eq!(loaded.settings, SettingsDocument::default());
    assert_eq!(storage.write_count(), 0);
}

#[test]
fn unknown_keys_survive_updates() {
    let storage = Arc::new(MemoryStorage::with_item(
        SETTINGS_KEY,
        r#"{"deviceId": "abc", "loaded": false, "futureFlag": 7}"#,
    ));
    let store = open(&storage);
    store.load();

    store.update_with(|doc| SettingsDocument {
        webhook_enabled: true,
        ..doc.clone()
    });
    store.flush();

    let stored = stored_json(&storage);
    assert_eq!(stored["futureFlag"], 7);
    assert_eq!(stored["loaded"], false);
    assert_eq!(stored["deviceId"], "abc");
    assert_eq!(stored["webhookEnabled"], true);
}

#[test]
fn unreadable_document_is_replaced_by_defaults() {
    for raw in ["not json", "[1, 2]"] {
        let storage = Arc::new(MemoryStorage::with_item(SETTINGS_KEY, raw));
        let store = open(&storage);

        let loaded = store.load();
        store.flush();

        assert!(loaded.ready, "case {raw}");
        assert!(loaded.settings.has_device_id(), "case {raw}");
        assert_eq!(loaded.settings.reminder_time, "18:00", "case {raw}");
        assert_eq!(storage.write_count(), 1, "case {raw}");
    }
}

#[test]
fn wrongly_typed_field_keeps_device_id_and_other_settings() {
    let storage = Arc::new(MemoryStorage::with_item(
        SETTINGS_KEY,
        r#"{"deviceId": "abc", "reminderEnabled": true, "reminderTime": 1800, "passcode": 1234}"#,
    ));
    let store = open(&storage);

    let loaded = store.load();
    store.flush();

    assert!(loaded.ready);
    assert_eq!(loaded.settings.device_id.as_deref(), Some("abc"));
    assert!(loaded.settings.reminder_enabled);
    assert_eq!(loaded.settings.reminder_time, "18:00");
    assert_eq!(loaded.settings.passcode, None);
    assert_eq!(storage.write_count(), 0);

    store.update_with(|doc| doc.clone());
    store.flush();
    let stored = stored_json(&storage);
    assert_eq!(stored["deviceId"], "abc");
    assert_eq!(stored["reminderEnabled"], true);
    assert_eq!(stored["reminderTime"], "18:00");
}

#[test]
fn sqlite_storage_persists_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("settings.sqlite");
    let db = db.to_string_lossy();

    let id = {
        let store = SettingsStore::open(Arc::new(SqliteStorage::open(&db).unwrap())).unwrap();
        let id = store.load().settings.device_id.unwrap();
        store.update_with(|doc| SettingsDocument {
            reminder_time: "06:30".into(),
            ..doc.clone()
        });
        store.close();
        id
    };

    let store = SettingsStore::open(Arc::new(SqliteStorage::open(&db).unwrap())).unwrap();
    let loaded = store.load();
    assert_eq!(loaded.settings.device_id.as_deref(), Some(id.as_str()));
    assert_eq!(loaded.settings.reminder_time, "06:30");
}
