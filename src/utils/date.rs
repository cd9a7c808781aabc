use chrono::{Datelike, Months, NaiveDate};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

pub fn first_of_month(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

/// First day of the month `offset` months away from the month containing `d`.
pub fn shift_month(d: NaiveDate, offset: i32) -> Option<NaiveDate> {
    let first = first_of_month(d);
    let months = Months::new(offset.unsigned_abs());
    if offset >= 0 {
        first.checked_add_months(months)
    } else {
        first.checked_sub_months(months)
    }
}

pub fn days_in_month(d: NaiveDate) -> u32 {
    shift_month(d, 1)
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}
