//! Feedback submission: one JSON POST per user action, no retries.

use crate::errors::AppResult;
use crate::utils::time::iso_now;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackCategory {
    #[default]
    Issue,
    Idea,
    Other,
}

impl FeedbackCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackCategory::Issue => "issue",
            FeedbackCategory::Idea => "idea",
            FeedbackCategory::Other => "other",
        }
    }
}

impl fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user filled in, plus arbitrary caller context.
#[derive(Debug, Clone, Default)]
pub struct FeedbackForm {
    pub category: FeedbackCategory,
    pub message: String,
    pub data: Map<String, Value>,
}

impl FeedbackForm {
    pub fn new(category: FeedbackCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            data: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackFailure {
    /// The endpoint answered with a non-2xx status.
    Status(u16),
    /// No response at all.
    Transport(String),
}

impl fmt::Display for FeedbackFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackFailure::Status(code) => write!(f, "endpoint answered HTTP {code}"),
            FeedbackFailure::Transport(msg) => write!(f, "request failed: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackOutcome {
    Delivered,
    Failed(FeedbackFailure),
}

impl FeedbackOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, FeedbackOutcome::Delivered)
    }
}

/// Caller fields first, then `locale`, `date`, `type`, `message`.
/// The four fixed keys replace caller fields of the same name.
pub fn build_payload(form: &FeedbackForm, locale: &str, date: &str) -> Value {
    let mut body = form.data.clone();
    body.insert("locale".into(), Value::from(locale));
    body.insert("date".into(), Value::from(date));
    body.insert("type".into(), Value::from(form.category.as_str()));
    body.insert("message".into(), Value::from(form.message.as_str()));
    Value::Object(body)
}

pub struct FeedbackSubmitter {
    client: Client,
    endpoint: String,
    locale: String,
}

impl FeedbackSubmitter {
    pub fn new(endpoint: impl Into<String>, locale: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("pixeltracker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            locale: locale.into(),
        })
    }

    /// Use a preconfigured client (proxies, timeouts, test doubles).
    pub fn with_client(client: Client, endpoint: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            locale: locale.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Single attempt, `application/json` body. The response body is ignored;
    /// only the status counts.
    pub fn submit(&self, form: &FeedbackForm) -> FeedbackOutcome {
        let body = build_payload(form, &self.locale, &iso_now());

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send();

        match resp {
            Ok(r) if r.status().is_success() => {
                info!(category = %form.category, "feedback delivered");
                FeedbackOutcome::Delivered
            }
            Ok(r) => {
                let code = r.status().as_u16();
                warn!(status = code, "feedback rejected by endpoint");
                FeedbackOutcome::Failed(FeedbackFailure::Status(code))
            }
            Err(e) => {
                warn!(error = %e, "feedback request failed");
                FeedbackOutcome::Failed(FeedbackFailure::Transport(e.to_string()))
            }
        }
    }
}
