//! Sliding month window shown by the calendar view.

use crate::utils::date::{days_in_month, first_of_month, shift_month};
use chrono::{Datelike, NaiveDate};

pub const MONTHS_BEFORE: i32 = 6;
pub const MONTHS_AFTER: i32 = 1;

/// First day of every month from [`MONTHS_BEFORE`] months before `today`
/// to [`MONTHS_AFTER`] after, ascending.
pub fn month_window(today: NaiveDate) -> Vec<NaiveDate> {
    (-MONTHS_BEFORE..=MONTHS_AFTER)
        .filter_map(|offset| shift_month(today, offset))
        .collect()
}

pub fn is_current_month(month: NaiveDate, today: NaiveDate) -> bool {
    month.year() == today.year() && month.month() == today.month()
}

/// Compact month grid, weeks starting on Monday. `today` is bracketed when
/// it falls in `month`.
pub fn render_month(month: NaiveDate, today: NaiveDate) -> String {
    let first = first_of_month(month);
    let mut out = format!("{}\n", first.format("%B %Y"));
    out.push_str(" Mo  Tu  We  Th  Fr  Sa  Su\n");

    let lead = first.weekday().num_days_from_monday() as usize;
    let mut cells: Vec<String> = vec!["    ".to_string(); lead];
    for day in 1..=days_in_month(first) {
        let cell = if is_current_month(first, today) && day == today.day() {
            format!("[{day:>2}]")
        } else {
            format!(" {day:>2} ")
        };
        cells.push(cell);
    }

    for week in cells.chunks(7) {
        out.push_str(week.concat().trim_end());
        out.push('\n');
    }
    out
}
