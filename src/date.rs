//! Date normalization for rate queries.
//!
//! The rate source addresses published data by a dotted `yyyy.M.d` tag, so
//! every user-supplied date is funneled into a `NaiveDate` first and only
//! rendered through [`canonical`] when a key or URL needs text.

use crate::error::RateError;
use chrono::{NaiveDate, Utc};

/// Normalizes arbitrary date input into a calendar date.
///
/// Empty input and the literal `"latest"` (any case) mean the current UTC
/// date. The canonical dotted form (`2024.3.6` or `2024.03.06`) parses
/// directly; anything else gets a best-effort parse of the common separators
/// and orderings (`2024-03-06`, `1/1/25`, `01-02-24`). Input that survives
/// neither parser is an error, not a silent fallback to today.
pub fn normalize(input: &str) -> Result<NaiveDate, RateError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("latest") {
        return Ok(today_utc());
    }

    parse_loose(trimmed).ok_or_else(|| RateError::InvalidDate(input.to_string()))
}

/// Renders a date in the canonical unpadded `yyyy.M.d` form used for cache
/// keys and remote queries. Round-trips losslessly through [`normalize`].
pub fn canonical(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!("{:04}.{}.{}", date.year(), date.month(), date.day())
}

/// Current calendar date, UTC-anchored.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Splits on the common separators and classifies the field order: a
/// four-digit leading segment is year-first, otherwise US month-first. A
/// trailing year segment is this-century shorthand (one or two digits) or
/// a literal four-digit year; any other width is rejected rather than
/// coerced. Out-of-range fields fail via `from_ymd_opt` rather than
/// wrapping into a different date.
fn parse_loose(input: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = input.split(['.', '/', '-']).map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }

    let nums = parts
        .iter()
        .map(|p| p.parse::<u32>().ok())
        .collect::<Option<Vec<u32>>>()?;

    let (year, month, day) = if parts[0].len() == 4 {
        (nums[0] as i32, nums[1], nums[2])
    } else {
        let year = match parts[2].len() {
            1 | 2 => 2000 + nums[2] as i32,
            4 => nums[2] as i32,
            _ => return None,
        };
        (year, nums[0], nums[1])
    };

    NaiveDate::from_ymd_opt(year, month, day)
}
