//! Display formatting shared by the browse page and the CLI

use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;

/// Shown where a chart has no publication date
pub const MISSING_DATE: &str = "–";

const DATE_FORMAT: &str = "%d.%m.%Y, %H:%M";

/// `DD.MM.YYYY, HH:MM` in the viewer's local time zone
pub fn format_date(date: &DateTime<Utc>) -> String {
    format_date_in(date, &Local)
}

/// `DD.MM.YYYY, HH:MM` in `tz`
pub fn format_date_in<Tz>(date: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.with_timezone(tz).format(DATE_FORMAT).to_string()
}

pub fn format_optional_date(date: Option<&DateTime<Utc>>) -> String {
    date.map(format_date)
        .unwrap_or_else(|| MISSING_DATE.to_string())
}

/// Result counter text, e.g. `1 chart found` / `120 charts found`
pub fn result_count_label(total: u64) -> String {
    if total == 1 {
        "1 chart found".to_string()
    } else {
        format!("{} charts found", total)
    }
}
