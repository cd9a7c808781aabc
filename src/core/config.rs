use crate::config::Config;
use crate::errors::{AppError, AppResult};
use std::path::Path;
use std::process::Command;

pub struct ConfigLogic;

impl ConfigLogic {
    pub fn print(cfg: &Config) -> AppResult<()> {
        println!("📄 Current configuration:\n");
        println!("{}", serde_yaml::to_string(cfg)?);
        Ok(())
    }

    /// Open `path` in the requested editor, falling back to $EDITOR/$VISUAL
    /// and then to a platform default.
    pub fn edit(path: &Path, editor: Option<&str>) -> AppResult<String> {
        let default_editor = std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .unwrap_or_else(|_| {
                if cfg!(target_os = "windows") {
                    "notepad".to_string()
                } else {
                    "nano".to_string()
                }
            });

        let first = editor.map(str::to_string).unwrap_or_else(|| default_editor.clone());

        match Command::new(&first).arg(path).status() {
            Ok(s) if s.success() => return Ok(first),
            _ => tracing::warn!(editor = %first, "editor not available, trying fallback"),
        }

        match Command::new(&default_editor).arg(path).status() {
            Ok(s) if s.success() => Ok(default_editor),
            Ok(s) => Err(AppError::Config(format!(
                "editor '{default_editor}' exited with {s}"
            ))),
            Err(e) => Err(AppError::Config(e.to_string())),
        }
    }
}
