//! Parsing of user-supplied `KEY VALUE` edits into the settings document.

use crate::errors::{AppError, AppResult};
use crate::settings::model::{ScaleType, SettingsDocument};
use crate::utils::time::parse_time;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    PasscodeEnabled,
    Passcode,
    WebhookEnabled,
    WebhookUrl,
    ScaleType,
    ReminderEnabled,
    ReminderTime,
}

impl SettingKey {
    pub const ALL: [SettingKey; 7] = [
        SettingKey::PasscodeEnabled,
        SettingKey::Passcode,
        SettingKey::WebhookEnabled,
        SettingKey::WebhookUrl,
        SettingKey::ScaleType,
        SettingKey::ReminderEnabled,
        SettingKey::ReminderTime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SettingKey::PasscodeEnabled => "passcode-enabled",
            SettingKey::Passcode => "passcode",
            SettingKey::WebhookEnabled => "webhook-enabled",
            SettingKey::WebhookUrl => "webhook-url",
            SettingKey::ScaleType => "scale-type",
            SettingKey::ReminderEnabled => "reminder-enabled",
            SettingKey::ReminderTime => "reminder-time",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        SettingKey::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| AppError::UnknownSetting(s.to_string()))
    }
}

fn invalid(key: SettingKey, reason: impl Into<String>) -> AppError {
    AppError::InvalidSetting {
        key: key.name().to_string(),
        reason: reason.into(),
    }
}

fn parse_bool(key: SettingKey, raw: &str) -> AppResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(invalid(key, format!("'{other}' is not a boolean"))),
    }
}

/// Return a copy of `doc` with `key` set from `raw`.
pub fn apply_setting(doc: &SettingsDocument, key: SettingKey, raw: &str) -> AppResult<SettingsDocument> {
    let mut next = doc.clone();
    let raw = raw.trim();

    match key {
        SettingKey::PasscodeEnabled => {
            let enabled = parse_bool(key, raw)?;
            if enabled && next.passcode.is_none() {
                return Err(invalid(key, "set a passcode before enabling it"));
            }
            next.passcode_enabled = enabled;
        }
        SettingKey::Passcode => {
            if raw.eq_ignore_ascii_case("none") {
                next.passcode = None;
                next.passcode_enabled = false;
            } else if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
                next.passcode = Some(raw.to_string());
            } else {
                return Err(invalid(key, "passcode must contain digits only"));
            }
        }
        SettingKey::WebhookEnabled => next.webhook_enabled = parse_bool(key, raw)?,
        SettingKey::WebhookUrl => {
            if !raw.is_empty() && !(raw.starts_with("http://") || raw.starts_with("https://")) {
                return Err(invalid(key, "URL must start with http:// or https://"));
            }
            next.webhook_url = raw.to_string();
        }
        SettingKey::ScaleType => {
            next.scale_type = raw.parse::<ScaleType>().map_err(|e| invalid(key, e))?;
        }
        SettingKey::ReminderEnabled => next.reminder_enabled = parse_bool(key, raw)?,
        SettingKey::ReminderTime => {
            let t = parse_time(raw).ok_or_else(|| AppError::InvalidTime(raw.to_string()))?;
            next.reminder_time = t.format("%H:%M").to_string();
        }
    }

    Ok(next)
}
