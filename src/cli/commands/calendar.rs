use crate::calendar::{is_current_month, month_window, render_month};
use crate::cli::parser::Commands;
use crate::errors::{AppError, AppResult};
use crate::utils::date::{parse_date, today};

pub fn handle(cmd: &Commands) -> AppResult<()> {
    if let Commands::Calendar { date } = cmd {
        let reference = match date {
            Some(raw) => parse_date(raw).ok_or_else(|| AppError::InvalidDate(raw.clone()))?,
            None => today(),
        };

        for month in month_window(reference) {
            let marker = if is_current_month(month, reference) { "▶ " } else { "" };
            println!("{}{}", marker, render_month(month, reference));
        }
    }

    Ok(())
}
