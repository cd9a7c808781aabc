use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_FEEDBACK_URL: &str = "https://f7e52509fce26bc860d05c9cffff8d87.m.pipedream.net";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_feedback_url")]
    pub feedback_url: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_feedback_url() -> String {
    DEFAULT_FEEDBACK_URL.to_string()
}
fn default_locale() -> String {
    "en-US".to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            feedback_url: default_feedback_url(),
            locale: default_locale(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("pixeltracker")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".pixeltracker")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("pixeltracker.conf")
    }

    /// Return the full path of the SQLite storage database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("pixeltracker.sqlite")
    }

    /// Load configuration from file, or return defaults if not found.
    /// Missing fields in an older file are filled with their defaults.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        let cfg: Config = serde_yaml::from_str(&content)?;
        Ok(cfg)
    }

    /// Initialize configuration directory and file.
    ///
    /// `custom_db` may be absolute or relative to the config directory.
    /// When `is_test` is set the config file is left untouched.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();

        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        if !is_test {
            fs::create_dir_all(&dir)?;
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(config)
    }
}
