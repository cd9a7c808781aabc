use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Color palette used to render mood ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScaleType {
    #[default]
    #[serde(rename = "ColorBrew-RdYlGn")]
    RdYlGn,
    #[serde(rename = "ColorBrew-PiYG")]
    PiYG,
}

impl ScaleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleType::RdYlGn => "ColorBrew-RdYlGn",
            ScaleType::PiYG => "ColorBrew-PiYG",
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScaleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "colorbrew-rdylgn" | "rdylgn" => Ok(ScaleType::RdYlGn),
            "colorbrew-piyg" | "piyg" => Ok(ScaleType::PiYG),
            other => Err(format!(
                "'{other}' is not a palette (expected ColorBrew-RdYlGn or ColorBrew-PiYG)"
            )),
        }
    }
}

/// One outbound webhook attempt and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookHistoryEntry {
    pub url: String,
    pub date: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// The persisted settings blob.
///
/// Keys not known to this version are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    pub device_id: Option<String>,
    pub passcode_enabled: bool,
    pub passcode: Option<String>,
    pub webhook_enabled: bool,
    pub webhook_url: String,
    pub webhook_history: Vec<WebhookHistoryEntry>,
    pub scale_type: ScaleType,
    pub reminder_enabled: bool,
    pub reminder_time: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            device_id: None,
            passcode_enabled: false,
            passcode: None,
            webhook_enabled: false,
            webhook_url: String::new(),
            webhook_history: Vec::new(),
            scale_type: ScaleType::default(),
            reminder_enabled: false,
            reminder_time: "18:00".to_string(),
            extra: Map::new(),
        }
    }
}

impl SettingsDocument {
    /// Shallow merge of a stored JSON object over the default document.
    ///
    /// Stored keys win, one field at a time. A known field whose value does
    /// not fit its type keeps its default; unknown keys land in `extra`.
    pub fn merged_over_defaults(stored: Map<String, Value>) -> Self {
        let mut doc = SettingsDocument::default();
        for (key, value) in stored {
            match key.as_str() {
                "deviceId" => merge_field(&mut doc.device_id, &key, value),
                "passcodeEnabled" => merge_field(&mut doc.passcode_enabled, &key, value),
                "passcode" => merge_field(&mut doc.passcode, &key, value),
                "webhookEnabled" => merge_field(&mut doc.webhook_enabled, &key, value),
                "webhookUrl" => merge_field(&mut doc.webhook_url, &key, value),
                "webhookHistory" => doc.webhook_history = merge_history(value),
                "scaleType" => merge_field(&mut doc.scale_type, &key, value),
                "reminderEnabled" => merge_field(&mut doc.reminder_enabled, &key, value),
                "reminderTime" => merge_field(&mut doc.reminder_time, &key, value),
                _ => {
                    doc.extra.insert(key, value);
                }
            }
        }
        doc
    }

    pub fn has_device_id(&self) -> bool {
        self.device_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

fn merge_field<T: DeserializeOwned>(slot: &mut T, key: &str, value: Value) {
    match serde_json::from_value(value) {
        Ok(v) => *slot = v,
        Err(e) => warn!(field = key, error = %e, "stored setting has the wrong type, using default"),
    }
}

/// Entries that do not parse are dropped; the rest keep their order.
fn merge_history(value: Value) -> Vec<WebhookHistoryEntry> {
    let Value::Array(items) = value else {
        warn!("stored webhook history is not a list, starting empty");
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "dropping malformed webhook history entry");
                None
            }
        })
        .collect()
}
