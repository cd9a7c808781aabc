//! Unified application error type.
//! All modules (db, storage, settings, feedback, cli) return AppError to keep
//! the error handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Storage-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    // ---------------------------
    // Serialization
    // ---------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("Invalid field (expected KEY=VALUE): {0}")]
    InvalidField(String),

    // ---------------------------
    // Network
    // ---------------------------
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feedback not delivered: {0}")]
    FeedbackNotDelivered(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,
}

pub type AppResult<T> = Result<T, AppError>;
