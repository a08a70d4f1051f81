//! Detection of textual dates/times and conversion to Excel serial values.
//!
//! Serial dates count days from 1899-12-31 (serial 1 = 1900-01-01). Excel's
//! 1900 date system treats 1900 as a leap year, so every date from
//! 1900-03-01 onward is one day later than a plain day count.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

/// The literal formats recognized in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeFormat {
    /// `M/d/yyyy`
    ShortDate,
    /// `dddd, MMMM d, yyyy`
    LongDate,
    /// `h:mm AM/PM`
    ShortTime,
    /// `h:mm:ss AM/PM`
    LongTime,
}

static SHORT_DATE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").ok());

static LONG_DATE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"^(Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday), (January|February|March|April|May|June|July|August|September|October|November|December) (\d{1,2}), (\d{4})$",
    )
    .ok()
});

static SHORT_TIME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2}) ?([AaPp][Mm])$").ok());

static LONG_TIME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2}) ?([AaPp][Mm])$").ok());

fn captures<'t>(pattern: &Lazy<Option<Regex>>, value: &'t str) -> Option<regex::Captures<'t>> {
    let pattern: &Option<Regex> = pattern;
    pattern.as_ref().and_then(|re| re.captures(value))
}

const EPOCH: (i32, u32, u32) = (1899, 12, 31);
const FAKE_LEAP_DAY_CUTOFF: (i32, u32, u32) = (1900, 3, 1);
const SECONDS_PER_DAY: f64 = 86_400.0;

/// A parsed date/time literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedDateTime {
    Date(NaiveDate),
    Time(NaiveTime),
}

impl ParsedDateTime {
    /// Excel serial value. Time-only values fall on the epoch's first day.
    #[must_use]
    pub fn to_serial(self) -> Option<f64> {
        match self {
            Self::Date(date) => date_to_serial(date),
            Self::Time(time) => Some(time_fraction(time)),
        }
    }
}

/// Detect which literal format `value` uses, after semantic validation.
#[must_use]
pub fn detect_format(value: &str) -> Option<DateTimeFormat> {
    parse_date_time(value).map(|(format, _)| format)
}

/// Parse `value` in one of the recognized formats.
///
/// `2/30/1996` and weekday names that disagree with the calendar are rejected.
#[must_use]
pub fn parse_date_time(value: &str) -> Option<(DateTimeFormat, ParsedDateTime)> {
    let value = value.trim();

    if let Some(caps) = captures(&SHORT_DATE, value) {
        let month = caps.get(1)?.as_str().parse().ok()?;
        let day = caps.get(2)?.as_str().parse().ok()?;
        let year = caps.get(3)?.as_str().parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        return Some((DateTimeFormat::ShortDate, ParsedDateTime::Date(date)));
    }

    if let Some(caps) = captures(&LONG_DATE, value) {
        let weekday: Weekday = caps.get(1)?.as_str().parse().ok()?;
        let month = month_number(caps.get(2)?.as_str())?;
        let day = caps.get(3)?.as_str().parse().ok()?;
        let year = caps.get(4)?.as_str().parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        if date.weekday() != weekday {
            return None;
        }
        return Some((DateTimeFormat::LongDate, ParsedDateTime::Date(date)));
    }

    if let Some(caps) = captures(&LONG_TIME, value) {
        let time = time_from_parts(
            caps.get(1)?.as_str(),
            caps.get(2)?.as_str(),
            Some(caps.get(3)?.as_str()),
            caps.get(4)?.as_str(),
        )?;
        return Some((DateTimeFormat::LongTime, ParsedDateTime::Time(time)));
    }

    if let Some(caps) = captures(&SHORT_TIME, value) {
        let time = time_from_parts(
            caps.get(1)?.as_str(),
            caps.get(2)?.as_str(),
            None,
            caps.get(3)?.as_str(),
        )?;
        return Some((DateTimeFormat::ShortTime, ParsedDateTime::Time(time)));
    }

    None
}

/// Convert a recognized literal directly to an Excel serial value.
#[must_use]
pub fn to_excel_serial(value: &str) -> Option<f64> {
    parse_date_time(value).and_then(|(_, parsed)| parsed.to_serial())
}

/// Serial day number for `date` in the 1900 date system.
///
/// Dates before 1900-01-01 have no serial and return `None`.
#[must_use]
pub fn date_to_serial(date: NaiveDate) -> Option<f64> {
    let epoch = NaiveDate::from_ymd_opt(EPOCH.0, EPOCH.1, EPOCH.2)?;
    let cutoff = NaiveDate::from_ymd_opt(
        FAKE_LEAP_DAY_CUTOFF.0,
        FAKE_LEAP_DAY_CUTOFF.1,
        FAKE_LEAP_DAY_CUTOFF.2,
    )?;
    let mut days = date.signed_duration_since(epoch).num_days();
    if days < 1 {
        return None;
    }
    if date >= cutoff {
        days += 1;
    }
    #[allow(clippy::cast_precision_loss)]
    Some(days as f64)
}

fn time_fraction(time: NaiveTime) -> f64 {
    f64::from(time.num_seconds_from_midnight()) / SECONDS_PER_DAY
}

fn time_from_parts(
    hour: &str,
    minute: &str,
    second: Option<&str>,
    meridiem: &str,
) -> Option<NaiveTime> {
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    let second: u32 = match second {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if !(1..=12).contains(&hour) {
        return None;
    }
    let pm = meridiem.eq_ignore_ascii_case("pm");
    let hour24 = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };
    NaiveTime::from_hms_opt(hour24, minute, second)
}

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    MONTHS
        .iter()
        .position(|m| *m == name)
        .and_then(|i| u32::try_from(i + 1).ok())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    fn serial(value: &str) -> f64 {
        to_excel_serial(value).unwrap_or_else(|| panic!("{value} not recognized"))
    }

    #[test]
    fn test_epoch_start() {
        assert_eq!(serial("1/1/1900"), 1.0);
        assert_eq!(serial("1/2/1900"), 2.0);
        assert_eq!(serial("2/28/1900"), 59.0);
    }

    #[test]
    fn test_leap_year_bug_offset() {
        // serial 60 is the non-existent 1900-02-29
        assert_eq!(serial("3/1/1900"), 61.0);
        assert_eq!(serial("1/1/2000"), 36526.0);
    }

    #[test]
    fn test_long_date() {
        assert_eq!(
            detect_format("Saturday, January 1, 2000"),
            Some(DateTimeFormat::LongDate)
        );
        assert_eq!(serial("Saturday, January 1, 2000"), 36526.0);
        // wrong weekday
        assert_eq!(detect_format("Monday, January 1, 2000"), None);
    }

    #[test]
    fn test_invalid_calendar_date_rejected() {
        assert_eq!(detect_format("2/30/1996"), None);
        assert_eq!(detect_format("13/1/1996"), None);
        assert_eq!(detect_format("2/29/1996"), Some(DateTimeFormat::ShortDate));
    }

    #[test]
    fn test_times() {
        assert!((serial("1:00 AM") - 1.0 / 24.0).abs() < 1e-9);
        assert!((serial("12:00 PM") - 0.5).abs() < 1e-9);
        assert!(serial("12:00 AM").abs() < 1e-9);
        assert!((serial("6:30:30 PM") - (18.0 * 3600.0 + 1830.0) / 86400.0).abs() < 1e-9);
        assert_eq!(detect_format("1:00 AM"), Some(DateTimeFormat::ShortTime));
        assert_eq!(detect_format("1:00:00 AM"), Some(DateTimeFormat::LongTime));
        assert_eq!(detect_format("13:00 PM"), None);
        assert_eq!(detect_format("1:60 PM"), None);
    }

    #[test]
    fn test_not_dates() {
        assert_eq!(detect_format("hello"), None);
        assert_eq!(detect_format("1/2"), None);
        assert_eq!(detect_format("2024-01-01"), None);
        assert_eq!(to_excel_serial("12/31/1899"), None);
    }
}
