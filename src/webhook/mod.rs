//! Outbound webhook delivery and its history in the settings document.

use crate::errors::AppResult;
use crate::settings::{SettingsDocument, SettingsStore, WebhookHistoryEntry};
use crate::storage::KeyValueStorage;
use crate::utils::time::iso_now;
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{info, warn};

pub const MAX_HISTORY: usize = 50;

pub struct WebhookNotifier {
    client: Client,
}

impl WebhookNotifier {
    pub fn new() -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("pixeltracker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// POST `body` to the configured webhook and record the attempt.
    ///
    /// Returns `None` without any network traffic when webhooks are off or
    /// no URL is set.
    pub fn notify<S: KeyValueStorage>(
        &self,
        store: &SettingsStore<S>,
        body: &Value,
    ) -> Option<WebhookHistoryEntry> {
        let settings = store.settings();
        if !settings.webhook_enabled || settings.webhook_url.trim().is_empty() {
            return None;
        }

        let entry = self.send(&settings.webhook_url, body);
        let recorded = entry.clone();
        store.update_with(move |doc| with_history_entry(doc, recorded));
        Some(entry)
    }

    fn send(&self, url: &str, body: &Value) -> WebhookHistoryEntry {
        let raw_body = body.to_string();
        let mut entry = WebhookHistoryEntry {
            url: url.to_string(),
            date: iso_now(),
            body: raw_body.clone(),
            status_code: None,
            status_text: None,
            is_error: false,
            error_message: None,
        };

        match self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(raw_body)
            .send()
        {
            Ok(resp) => {
                let status = resp.status();
                entry.status_code = Some(status.as_u16());
                entry.status_text = status.canonical_reason().map(str::to_string);
                entry.is_error = !status.is_success();
                if entry.is_error {
                    warn!(url, status = status.as_u16(), "webhook rejected");
                } else {
                    info!(url, status = status.as_u16(), "webhook delivered");
                }
            }
            Err(e) => {
                warn!(url, error = %e, "webhook request failed");
                entry.is_error = true;
                entry.error_message = Some(e.to_string());
            }
        }

        entry
    }
}

/// Prepend `entry`, keeping at most [`MAX_HISTORY`] entries.
pub fn with_history_entry(doc: &SettingsDocument, entry: WebhookHistoryEntry) -> SettingsDocument {
    let mut next = doc.clone();
    next.webhook_history.insert(0, entry);
    next.webhook_history.truncate(MAX_HISTORY);
    next
}

pub fn clear_history<S: KeyValueStorage>(store: &SettingsStore<S>) -> SettingsDocument {
    store.update_with(|doc| SettingsDocument {
        webhook_history: Vec::new(),
        ..doc.clone()
    })
}
