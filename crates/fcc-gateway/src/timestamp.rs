//! Date parsing for the timestamp microservice.
//!
//! Accepts Unix milliseconds or a handful of common date spellings and
//! reports instants in UTC.

use jiff::civil::{Date, DateTime};
use jiff::fmt::{rfc2822, strtime};
use jiff::tz::TimeZone;
use jiff::Timestamp;

/// Day-month-year spellings, tried after the trailing zone name is removed.
const CIVIL_DATE_FORMATS: &[&str] = &["%d %B %Y", "%d %b %Y", "%B %d, %Y", "%b %d, %Y", "%B %d %Y"];

/// Length of a Unix millisecond timestamp, sign included.
const UNIX_MILLIS_LEN: usize = 13;

/// Longest all-digit input read as a bare year.
const MAX_YEAR_DIGITS: usize = 6;

/// Zone names that mean UTC when trailing a civil date.
const UTC_SUFFIXES: &[&str] = &[", GMT", " GMT", ", UTC", " UTC", "Z"];

/// Parses the `:date` path segment. Returns `None` for anything that is not
/// a date, which the handler reports as `Invalid Date`.
pub fn parse_date(input: &str) -> Option<Timestamp> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if is_integer(input) {
        return parse_integer(input);
    }

    if let Ok(ts) = input.parse::<Timestamp>() {
        return Some(ts);
    }
    if let Ok(dt) = input.parse::<DateTime>() {
        return dt.to_zoned(TimeZone::UTC).ok().map(|zdt| zdt.timestamp());
    }
    if let Ok(date) = input.parse::<Date>() {
        return utc_midnight(date);
    }
    if let Ok(zdt) = rfc2822::parse(input) {
        return Some(zdt.timestamp());
    }

    let civil = UTC_SUFFIXES
        .iter()
        .find_map(|suffix| input.strip_suffix(suffix))
        .unwrap_or(input)
        .trim();
    CIVIL_DATE_FORMATS
        .iter()
        .find_map(|format| strtime::parse(format, civil).ok()?.to_date().ok())
        .and_then(utc_midnight)
}

/// Formats an instant as an HTTP date in GMT.
pub fn format_utc(ts: Timestamp) -> String {
    ts.strftime("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn is_integer(input: &str) -> bool {
    let digits = input.strip_prefix('-').unwrap_or(input);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Thirteen characters are Unix milliseconds and short unsigned numbers
/// are years. Any other integer is not a date.
fn parse_integer(input: &str) -> Option<Timestamp> {
    if input.len() == UNIX_MILLIS_LEN {
        let millis = input.parse::<i64>().ok()?;
        return Timestamp::from_millisecond(millis).ok();
    }

    if !input.starts_with('-') && input.len() <= MAX_YEAR_DIGITS {
        let year = input.parse::<i16>().ok()?;
        return Date::new(year, 1, 1).ok().and_then(utc_midnight);
    }

    None
}

fn utc_midnight(date: Date) -> Option<Timestamp> {
    date.to_zoned(TimeZone::UTC).ok().map(|zdt| zdt.timestamp())
}
