// claimstar-core/src/domain/silver/coerce.rs

//! Permissive field coercions. None of these fail: bad input becomes null
//! (dates, ages, stays) or zero (amounts). Values the warehouse columns cannot
//! hold count as bad input.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use tracing::warn;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

pub const AGE_GROUP_UNKNOWN: &str = "Unknown";

/// Years a source date may fall in. Open-ended markers such as `9999-12-31`
/// and placeholder birth dates such as `0001-01-01` sit outside.
pub const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i32> = 1677..=2262;

/// Magnitude a `DECIMAL(10,2)` column can hold once rounded to cents.
const MONEY_LIMIT: f64 = 99_999_999.995;

/// Longest stay a `SMALLINT` column can hold.
const MAX_STAY_DAYS: i64 = i16::MAX as i64;

pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    let parsed = DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        })
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })?;
    if !PLAUSIBLE_YEARS.contains(&parsed.year()) {
        warn!(value = s, "Date outside the plausible range treated as missing");
        return None;
    }
    Some(parsed)
}

/// Non-numeric, blank and non-finite amounts are 0.
pub fn parse_amount(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(bound_amount)
        .unwrap_or(0.0)
}

/// An amount too large for a money column is 0.
pub fn bound_amount(amount: f64) -> f64 {
    if amount.abs() < MONEY_LIMIT {
        amount
    } else {
        warn!(amount, "Amount exceeds the money column range, using 0");
        0.0
    }
}

/// Trimmed text; blank is absent.
pub fn clean_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Whole years between `dob` and `as_of`. A birthday not yet reached this year
/// does not count; a birth date in the future is no age at all.
pub fn calculate_age(dob: Option<NaiveDate>, as_of: NaiveDate) -> Option<i64> {
    let dob = dob?;
    let mut age = i64::from(as_of.year() - dob.year());
    if (as_of.month(), as_of.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    (age >= 0).then_some(age)
}

pub fn derive_age_group(age: Option<i64>) -> &'static str {
    match age {
        None => AGE_GROUP_UNKNOWN,
        Some(a) if a <= 12 => "0-12",
        Some(a) if a <= 17 => "13-17",
        Some(a) if a <= 25 => "18-25",
        Some(a) if a <= 35 => "26-35",
        Some(a) if a <= 45 => "36-45",
        Some(a) if a <= 60 => "46-60",
        Some(a) if a <= 75 => "61-75",
        Some(_) => "75+",
    }
}

/// An end before its start is dropped; the start is never touched.
pub fn resolve_end_date(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<NaiveDate> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => None,
        _ => end,
    }
}

/// Whole days from `start` to `end`. Negative spans floor to 0; a missing
/// date or a stay longer than the column holds yields no value.
pub fn length_of_stay(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<i64> {
    let days = match (start, end) {
        (Some(s), Some(e)) => (e - s).num_days().max(0),
        _ => return None,
    };
    if days > MAX_STAY_DAYS {
        warn!(days, "Length of stay exceeds the column range, leaving it null");
        return None;
    }
    Some(days)
}
