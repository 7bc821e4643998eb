//! Permissive date/time parsing under a single default locale.
//!
//! Formats are tried in order. Ambiguous numeric dates are read month-first;
//! the day-first formats only get a chance when the month-first reading is
//! impossible (e.g. `25/12/2021`). Offset-carrying timestamps are normalized
//! to UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

const DATETIME_FORMATS: [&str; 19] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%b %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 22] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%m/%d/%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d/%m/%y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%a, %b %d, %Y",
    "%A, %B %d, %Y",
    "%Y-%b-%d",
];

/// Parses one raw value, returning `None` when no known format matches.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_utc());
        }
    }

    DATETIME_FORMATS
        .iter()
        .filter(|fmt| year_width_fits(s, fmt))
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .filter(|fmt| year_width_fits(s, fmt))
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// chrono's `%Y` also takes one or two digits, which would read `12/25/21`
/// as year 21. A `%Y` format only applies when the input carries a 4-digit
/// year in that position: the leading digit run for year-first formats, a
/// later run otherwise.
fn year_width_fits(s: &str, fmt: &str) -> bool {
    if !fmt.contains("%Y") {
        return true;
    }
    let runs: Vec<usize> = s
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .map(str::len)
        .collect();
    if fmt.starts_with("%Y") {
        runs.first().is_some_and(|len| *len >= 4)
    } else {
        runs.iter().skip(1).any(|len| *len >= 4)
    }
}

/// Same as [`parse_datetime`], with a parser-style message on failure.
pub fn parse_strict(raw: &str) -> Result<NaiveDateTime, String> {
    parse_datetime(raw)
        .ok_or_else(|| format!("Unknown datetime string format, unable to parse: {raw}"))
}

/// ISO-8601 rendering; fractional seconds only when present.
pub fn to_iso(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_iso_dates() {
        assert_eq!(parse_datetime("2021-01-01"), Some(ymd_hms(2021, 1, 1, 0, 0, 0)));
        assert_eq!(
            parse_datetime("2021-03-03 14:05:09"),
            Some(ymd_hms(2021, 3, 3, 14, 5, 9))
        );
        assert_eq!(
            parse_datetime("2021-03-03T14:05:09+02:00"),
            Some(ymd_hms(2021, 3, 3, 12, 5, 9))
        );
    }

    #[test]
    fn test_month_first_then_day_first() {
        assert_eq!(parse_datetime("02/03/2021"), Some(ymd_hms(2021, 2, 3, 0, 0, 0)));
        assert_eq!(parse_datetime("25/12/2021"), Some(ymd_hms(2021, 12, 25, 0, 0, 0)));
    }

    #[test]
    fn test_two_digit_years() {
        assert_eq!(parse_datetime("01/02/21"), Some(ymd_hms(2021, 1, 2, 0, 0, 0)));
        assert_eq!(parse_datetime("12/25/21"), Some(ymd_hms(2021, 12, 25, 0, 0, 0)));
        assert_eq!(parse_datetime("25/12/21"), Some(ymd_hms(2021, 12, 25, 0, 0, 0)));
        assert_eq!(parse_datetime("01-Jan-21"), Some(ymd_hms(2021, 1, 1, 0, 0, 0)));
        assert_eq!(
            parse_datetime("12/25/21 08:15"),
            Some(ymd_hms(2021, 12, 25, 8, 15, 0))
        );
    }

    #[test]
    fn test_short_year_never_fills_four_digit_slot() {
        assert_eq!(parse_datetime("1/2/2021"), Some(ymd_hms(2021, 1, 2, 0, 0, 0)));
        assert_eq!(parse_datetime("1/2/21"), Some(ymd_hms(2021, 1, 2, 0, 0, 0)));
        assert_eq!(parse_datetime("21/1/2021"), Some(ymd_hms(2021, 1, 21, 0, 0, 0)));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(parse_datetime("Jan 5, 2021"), Some(ymd_hms(2021, 1, 5, 0, 0, 0)));
        assert_eq!(parse_datetime("5 March 2020"), Some(ymd_hms(2020, 3, 5, 0, 0, 0)));
    }

    #[test]
    fn test_rejects_non_dates() {
        assert_eq!(parse_datetime("not-a-date"), None);
        assert_eq!(parse_datetime("Yes"), None);
        assert_eq!(parse_datetime(""), None);
        assert!(parse_strict("abc").unwrap_err().contains("abc"));
    }

    #[test]
    fn test_iso_rendering() {
        assert_eq!(to_iso(&ymd_hms(2021, 1, 1, 0, 0, 0)), "2021-01-01T00:00:00");
    }
}
