//! Write-through settings store.
//!
//! The in-memory document is the source of truth for the running session.
//! Every mutation replaces it under a lock and enqueues the full serialized
//! document to a single background writer, which drains the queue in order.
//! Callers of [`SettingsStore::update`] are never told whether the write
//! landed; failures are logged and counted, nothing more.

use crate::errors::AppResult;
use crate::settings::model::SettingsDocument;
use crate::storage::{KeyValueStorage, SETTINGS_KEY};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Either a full replacement or a function of the current document.
pub enum SettingsUpdate {
    Replace(SettingsDocument),
    Mutate(Box<dyn FnOnce(&SettingsDocument) -> SettingsDocument>),
}

/// Result of [`SettingsStore::load`].
#[derive(Debug, Clone)]
pub struct Loaded {
    pub settings: SettingsDocument,
    pub ready: bool,
}

struct StoreState {
    document: SettingsDocument,
    ready: bool,
}

enum Job {
    Write(String),
    Flush(Sender<()>),
}

pub struct SettingsStore<S: KeyValueStorage> {
    storage: Arc<S>,
    state: Mutex<StoreState>,
    queue: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    write_failures: Arc<AtomicUsize>,
}

impl<S: KeyValueStorage> SettingsStore<S> {
    /// Start the persistence worker. The store holds defaults and is not
    /// ready until [`load`](Self::load) has produced a device identifier.
    pub fn open(storage: Arc<S>) -> AppResult<Self> {
        let (tx, rx) = mpsc::channel();
        let write_failures = Arc::new(AtomicUsize::new(0));

        let worker_storage = Arc::clone(&storage);
        let worker_failures = Arc::clone(&write_failures);
        let worker = thread::Builder::new()
            .name("settings-writer".into())
            .spawn(move || run_writer(worker_storage, rx, worker_failures))?;

        Ok(Self {
            storage,
            state: Mutex::new(StoreState {
                document: SettingsDocument::default(),
                ready: false,
            }),
            queue: Some(tx),
            worker: Some(worker),
            write_failures,
        })
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Read the stored document and merge it over the defaults.
    ///
    /// - nothing stored: defaults plus a fresh device id, persisted.
    /// - stored without device id: merged, id generated, persisted.
    /// - stored with device id: merged, nothing written.
    ///
    /// A read failure leaves the in-memory state untouched.
    pub fn load(&self) -> Loaded {
        let stored = match self.storage.get_item(SETTINGS_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                error!(error = %e, "failed to read settings, keeping in-memory state");
                return self.snapshot();
            }
        };

        match stored.and_then(|json| parse_stored(&json)) {
            None => {
                let doc = SettingsDocument {
                    device_id: Some(new_device_id()),
                    ..SettingsDocument::default()
                };
                info!("no stored settings, created defaults");
                self.commit(doc, true);
            }
            Some(mut doc) if !doc.has_device_id() => {
                doc.device_id = Some(new_device_id());
                info!("stored settings had no device id, generated one");
                self.commit(doc, true);
            }
            Some(doc) => {
                debug!("settings loaded");
                self.commit(doc, false);
            }
        }

        self.snapshot()
    }

    /// Apply `update` to the in-memory document and enqueue its persistence.
    /// Returns the new document.
    pub fn update(&self, update: SettingsUpdate) -> SettingsDocument {
        match update {
            SettingsUpdate::Replace(doc) => self.replace(doc),
            SettingsUpdate::Mutate(f) => self.update_with(f),
        }
    }

    pub fn replace(&self, doc: SettingsDocument) -> SettingsDocument {
        self.update_with(move |_| doc)
    }

    /// `f` always sees the latest in-memory document, including mutations
    /// whose writes are still queued. It runs under the store lock and must
    /// not call back into the store.
    pub fn update_with<F>(&self, f: F) -> SettingsDocument
    where
        F: FnOnce(&SettingsDocument) -> SettingsDocument,
    {
        let mut state = self.lock_state();
        let next = f(&state.document);
        state.document = next.clone();
        if state.document.has_device_id() {
            state.ready = true;
        }
        // Enqueued while the lock is held so queue order matches mutation order.
        self.enqueue(&next);
        next
    }

    /// Replace the document with defaults. No device id is generated here;
    /// the next [`load`](Self::load) will create a new one.
    pub fn reset(&self) -> SettingsDocument {
        info!("reset settings");
        self.replace(SettingsDocument::default())
    }

    pub fn settings(&self) -> SettingsDocument {
        self.lock_state().document.clone()
    }

    /// True once a device id has been present. Latches.
    pub fn is_ready(&self) -> bool {
        self.lock_state().ready
    }

    /// Writes that failed since the store was opened.
    pub fn write_failures(&self) -> usize {
        self.write_failures.load(Ordering::SeqCst)
    }

    /// Block until every write enqueued so far has been attempted.
    pub fn flush(&self) {
        let Some(queue) = &self.queue else {
            return;
        };
        let (ack_tx, ack_rx) = mpsc::channel();
        if queue.send(Job::Flush(ack_tx)).is_err() {
            warn!("settings writer is gone, nothing to flush");
            return;
        }
        let _ = ack_rx.recv();
    }

    /// Drain pending writes and stop the worker.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender ends the worker loop once the queue is empty.
        self.queue.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            error!("settings writer panicked");
        }
    }

    fn commit(&self, doc: SettingsDocument, persist: bool) {
        if persist {
            self.replace(doc);
        } else {
            let mut state = self.lock_state();
            state.ready = state.ready || doc.has_device_id();
            state.document = doc;
        }
    }

    fn snapshot(&self) -> Loaded {
        let state = self.lock_state();
        Loaded {
            settings: state.document.clone(),
            ready: state.ready,
        }
    }

    fn enqueue(&self, doc: &SettingsDocument) {
        let json = match serde_json::to_string(doc) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "failed to serialize settings");
                return;
            }
        };
        match &self.queue {
            Some(queue) if queue.send(Job::Write(json)).is_ok() => {}
            _ => error!("settings writer is gone, change kept in memory only"),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S: KeyValueStorage> Drop for SettingsStore<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_writer<S: KeyValueStorage>(storage: Arc<S>, jobs: Receiver<Job>, failures: Arc<AtomicUsize>) {
    for job in jobs {
        match job {
            Job::Write(json) => {
                if let Err(e) = storage.set_item(SETTINGS_KEY, &json) {
                    failures.fetch_add(1, Ordering::SeqCst);
                    error!(error = %e, "failed to persist settings");
                }
            }
            Job::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

/// `None` when the stored text is not a usable settings object.
fn parse_stored(json: &str) -> Option<SettingsDocument> {
    let value: Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "stored settings are not valid JSON, using defaults");
            return None;
        }
    };
    let Value::Object(map) = value else {
        warn!("stored settings are not a JSON object, using defaults");
        return None;
    };
    Some(SettingsDocument::merged_over_defaults(map))
}

fn new_device_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
