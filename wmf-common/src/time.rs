//! Date utilities for weekly snapshots

use chrono::{Datelike, NaiveDate, Utc};

/// Current UTC calendar date
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// ISO 8601 week number (1..=53) of `date`
pub fn iso_week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Parse a catalog release date of day, month or year precision
///
/// `"2024-05-17"`, `"2024-05"` and `"2024"` are accepted; missing parts
/// resolve to the first day of the period.
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let mut parts = raw.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 1,
    };
    let day: u32 = match parts.next() {
        Some(d) => d.parse().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}
