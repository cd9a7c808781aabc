use crate::settings::{SettingKey, SettingsDocument, WebhookHistoryEntry};
use crate::utils::table::{Column, Table};
use crate::utils::time::local_display;

pub struct SettingsLogic;

impl SettingsLogic {
    /// Human readable value of an editable setting. The passcode is masked.
    pub fn value_of(doc: &SettingsDocument, key: SettingKey) -> String {
        match key {
            SettingKey::PasscodeEnabled => doc.passcode_enabled.to_string(),
            SettingKey::Passcode => match &doc.passcode {
                Some(p) => "*".repeat(p.len()),
                None => "none".to_string(),
            },
            SettingKey::WebhookEnabled => doc.webhook_enabled.to_string(),
            SettingKey::WebhookUrl => {
                if doc.webhook_url.is_empty() {
                    "--".to_string()
                } else {
                    doc.webhook_url.clone()
                }
            }
            SettingKey::ScaleType => doc.scale_type.to_string(),
            SettingKey::ReminderEnabled => doc.reminder_enabled.to_string(),
            SettingKey::ReminderTime => doc.reminder_time.clone(),
        }
    }

    pub fn render(doc: &SettingsDocument) -> String {
        let mut table = Table::new(vec![Column::new("SETTING", 18), Column::new("VALUE", 48)]);
        table.add_row(vec![
            "device-id".to_string(),
            doc.device_id.clone().unwrap_or_else(|| "(not assigned)".to_string()),
        ]);
        for key in SettingKey::ALL {
            table.add_row(vec![key.name().to_string(), Self::value_of(doc, key)]);
        }
        table.add_row(vec![
            "webhook-history".to_string(),
            format!("{} entries", doc.webhook_history.len()),
        ]);
        if !doc.extra.is_empty() {
            let keys: Vec<&str> = doc.extra.keys().map(String::as_str).collect();
            table.add_row(vec!["(other keys)".to_string(), keys.join(", ")]);
        }
        table.render()
    }

    pub fn render_history(entries: &[WebhookHistoryEntry]) -> String {
        let mut table = Table::new(vec![
            Column::new("DATE", 19),
            Column::new("STATUS", 24),
            Column::new("URL", 40),
        ]);
        for e in entries {
            let status = match (e.status_code, &e.error_message) {
                (Some(code), _) => format!(
                    "{} {}",
                    code,
                    e.status_text.as_deref().unwrap_or_default()
                ),
                (None, Some(msg)) => format!("error: {msg}"),
                (None, None) => "--".to_string(),
            };
            let status = if e.is_error { format!("✗ {status}") } else { format!("✓ {status}") };
            table.add_row(vec![local_display(&e.date), status.trim_end().to_string(), e.url.clone()]);
        }
        table.render()
    }
}
