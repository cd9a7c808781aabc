use crate::cli::commands::{audit, finish_writes, open_store};
use crate::cli::parser::{Commands, WebhookAction};
use crate::config::Config;
use crate::core::settings::SettingsLogic;
use crate::errors::AppResult;
use crate::utils::time::iso_now;
use crate::webhook::{WebhookNotifier, clear_history};
use crate::ui::messages::{info, success, warning};
use serde_json::json;

/// Handle the `webhook` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Webhook { action } = cmd else {
        return Ok(());
    };

    let store = open_store(cfg)?;

    match action {
        WebhookAction::Test { message } => {
            let notifier = WebhookNotifier::new()?;
            let body = json!({
                "event": "test",
                "deviceId": store.settings().device_id,
                "date": iso_now(),
                "message": message,
            });

            match notifier.notify(&store, &body) {
                None => warning("Webhooks are disabled or no URL is configured."),
                Some(entry) => {
                    finish_writes(&store);
                    let status = entry
                        .status_code
                        .map(|c| c.to_string())
                        .or(entry.error_message.clone())
                        .unwrap_or_default();
                    if entry.is_error {
                        audit(&store, "webhook_failed", &entry.url, &status);
                        warning(format!("Webhook call failed: {}", status));
                    } else {
                        audit(&store, "webhook_sent", &entry.url, &status);
                        success(format!("Webhook delivered ({})", status));
                    }
                }
            }
        }

        WebhookAction::History => {
            let history = store.settings().webhook_history;
            if history.is_empty() {
                info("No webhook calls recorded.");
            } else {
                print!("{}", SettingsLogic::render_history(&history));
            }
        }

        WebhookAction::Clear => {
            clear_history(&store);
            finish_writes(&store);
            success("Webhook history cleared.");
        }
    }

    store.close();
    Ok(())
}
