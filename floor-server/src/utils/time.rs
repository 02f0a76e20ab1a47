//! Business timezone helpers
//!
//! Orders are numbered per local calendar day, so "today" is always taken in
//! the restaurant timezone, never UTC.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Parse a timezone name such as `Asia/Tashkent`
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.parse().ok()
}

/// Current business date
pub fn today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Business date of an epoch-millis timestamp
pub fn date_of_millis(millis: i64, tz: Tz) -> NaiveDate {
    to_local(millis, tz).date_naive()
}

/// Epoch millis in the business timezone
///
/// Out-of-range values collapse to the epoch.
pub fn to_local(millis: i64, tz: Tz) -> DateTime<Tz> {
    tz.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(|| tz.from_utc_datetime(&DateTime::<Utc>::UNIX_EPOCH.naive_utc()))
}

/// `dd.mm.yyyy HH:MM` as printed on tickets
pub fn format_ticket_time(millis: i64, tz: Tz) -> String {
    to_local(millis, tz).format("%d.%m.%Y %H:%M").to_string()
}
