use crate::cli::commands::{audit, finish_writes, open_store};
use crate::cli::parser::{Commands, SettingsAction};
use crate::config::Config;
use crate::core::settings::SettingsLogic;
use crate::errors::AppResult;
use crate::settings::{SettingKey, apply_setting};
use crate::ui::messages::{info, success, warning};
use std::io::{self, BufRead, Write};

/// Handle the `settings` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Settings { action } = cmd else {
        return Ok(());
    };

    let store = open_store(cfg)?;

    match action {
        SettingsAction::Show { json } => {
            let doc = store.settings();
            if *json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print!("{}", SettingsLogic::render(&doc));
            }
        }

        SettingsAction::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            // Validate against the current document before touching the store.
            let next = apply_setting(&store.settings(), key, value)?;
            store.replace(next);
            finish_writes(&store);

            let shown = SettingsLogic::value_of(&store.settings(), key);
            audit(&store, "settings_saved", key.name(), &format!("{} = {}", key, shown));
            success(format!("{} set to {}", key, shown));
        }

        SettingsAction::Reset { yes } => {
            if !*yes && !confirm("Reset all settings to their defaults? A new device id will be generated next time. [y/N] ")? {
                info("Reset cancelled.");
                return Ok(());
            }
            store.reset();
            finish_writes(&store);
            audit(&store, "settings_reset", "", "All settings restored to defaults");
            warning("Settings reset to defaults.");
        }
    }

    store.close();
    Ok(())
}

fn confirm(prompt: &str) -> AppResult<bool> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
