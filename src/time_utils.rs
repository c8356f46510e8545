// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting and working-day arithmetic.

use chrono::{DateTime, Datelike, Days, NaiveDate, SecondsFormat, Utc, Weekday};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Iterate the calendar days of an inclusive range.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let total = (end - start).num_days().max(-1) + 1;
    (0..total).filter_map(move |offset| start.checked_add_days(Days::new(offset as u64)))
}

/// Whether a date counts as a delivery working day (Sundays are off).
pub fn is_working_day(date: NaiveDate) -> bool {
    date.weekday() != Weekday::Sun
}

/// Allocate a document ID from the current time.
///
/// Microsecond resolution is plenty for a single-operator deployment.
pub fn timestamp_id() -> u64 {
    Utc::now().timestamp_micros() as u64
}
