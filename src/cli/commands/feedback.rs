use crate::cli::commands::{audit, open_store};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::feedback::{FeedbackCategory, FeedbackForm, FeedbackOutcome, FeedbackSubmitter};
use crate::ui::messages::{error, info, success};

/// Handle the `feedback` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Feedback {
        category,
        fields,
        endpoint,
        message,
    } = cmd
    else {
        return Ok(());
    };

    let store = open_store(cfg)?;
    let form = build_form(*category, message, fields, store.settings().device_id)?;

    let endpoint = endpoint.clone().unwrap_or_else(|| cfg.feedback_url.clone());
    let submitter = FeedbackSubmitter::new(endpoint, cfg.locale.clone())?;

    info(format!("Sending {} feedback to {}…", category, submitter.endpoint()));
    match submitter.submit(&form) {
        FeedbackOutcome::Delivered => {
            audit(&store, "feedback_sent", category.as_str(), message);
            success("Thanks! Your feedback has been sent.");
            Ok(())
        }
        FeedbackOutcome::Failed(failure) => {
            audit(&store, "feedback_failed", category.as_str(), &failure.to_string());
            error("Your feedback could not be sent. Please try again later.");
            Err(AppError::FeedbackNotDelivered(failure.to_string()))
        }
    }
}

/// The device id goes in first so a `--field deviceId=…` given by the user wins.
fn build_form(
    category: FeedbackCategory,
    message: &str,
    fields: &[String],
    device_id: Option<String>,
) -> AppResult<FeedbackForm> {
    let mut form = FeedbackForm::new(category, message);
    if let Some(device_id) = device_id {
        form = form.with_field("deviceId", device_id);
    }
    for raw in fields {
        let (k, v) = parse_field(raw)?;
        form = form.with_field(k, v);
    }
    Ok(form)
}

/// Split `KEY=VALUE`; the key must be non-empty.
fn parse_field(raw: &str) -> AppResult<(String, String)> {
    match raw.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(AppError::InvalidField(raw.to_string())),
    }
}
