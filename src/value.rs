use chrono::NaiveDateTime;
use std::fmt;

use crate::dates;

/// Raw tokens that stand for a missing cell, compared case-insensitively
/// after trimming.
pub const MISSING_TOKENS: [&str; 8] = [
    "Not Available",
    "NA",
    "N/A",
    "not available",
    "n/a",
    "",
    " ",
    "-",
];

const TRUE_TOKENS: [&str; 5] = ["true", "t", "yes", "y", "1"];
const FALSE_TOKENS: [&str; 5] = ["false", "f", "no", "n", "0"];

/// A single cell. `Null` is the missing-value sentinel shared by every
/// semantic type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// True for the sentinel, NaN, and text cells holding a missing token.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            Value::Text(s) => is_missing_token(s),
            _ => false,
        }
    }

    /// Numeric reading of the cell; text is parsed, booleans count as 1/0.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => parse_number(s),
            Value::Null | Value::DateTime(_) => None,
        }
    }

    /// Looks the cell up in the boolean mapping table.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(1) => Some(true),
            Value::Int(0) => Some(false),
            Value::Float(f) if *f == 1.0 => Some(true),
            Value::Float(f) if *f == 0.0 => Some(false),
            Value::Text(s) => parse_bool_token(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            Value::Text(s) => dates::parse_datetime(s),
            _ => None,
        }
    }

    /// String form of a non-missing cell.
    pub fn to_text(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        Some(self.to_string())
    }

    /// Key used when counting distinct values.
    pub(crate) fn distinct_key(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            other => format!("{other:?}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::DateTime(dt) => f.write_str(&dates::to_iso(dt)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

pub fn is_missing_token(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty()
        || MISSING_TOKENS
            .iter()
            .any(|token| token.eq_ignore_ascii_case(trimmed))
}

/// Decimal number parse of a trimmed string.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

pub fn parse_bool_token(raw: &str) -> Option<bool> {
    let folded = raw.trim().to_lowercase();
    if TRUE_TOKENS.contains(&folded.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&folded.as_str()) {
        Some(false)
    } else {
        None
    }
}

pub fn is_bool_token(raw: &str) -> bool {
    parse_bool_token(raw).is_some()
}

/// Whole-number view of a float, if it has no fractional part and fits an i64.
pub fn integral(x: f64) -> Option<i64> {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 9.2e18 {
        Some(x as i64)
    } else {
        None
    }
}

/// Wraps a parsed number, NaN collapsing to the sentinel.
pub fn float_value(x: f64) -> Value {
    if x.is_nan() { Value::Null } else { Value::Float(x) }
}

fn format_float(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 {
        format!("{x:.1}")
    } else {
        x.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tokens_case_insensitive() {
        for raw in ["Not Available", "NOT AVAILABLE", "na", "N/A", "", "   ", "-", " - "] {
            assert!(is_missing_token(raw), "{raw:?} should be missing");
        }
        assert!(!is_missing_token("0"));
        assert!(!is_missing_token("none"));
        assert!(Value::Null.is_missing());
        assert!(Value::Float(f64::NAN).is_missing());
        assert!(!Value::Int(0).is_missing());
    }

    #[test]
    fn test_bool_table() {
        assert_eq!(Value::text("YES").as_bool(), Some(true));
        assert_eq!(Value::text(" f ").as_bool(), Some(false));
        assert_eq!(Value::text("1").as_bool(), Some(true));
        assert_eq!(Value::Int(0).as_bool(), Some(false));
        assert_eq!(Value::Float(1.0).as_bool(), Some(true));
        assert_eq!(Value::Int(2).as_bool(), None);
        assert_eq!(Value::text("maybe").as_bool(), None);
        assert_eq!(Value::Null.as_bool(), None);
    }

    #[test]
    fn test_number_parsing() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("-3.5"), Some(-3.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(integral(3.0), Some(3));
        assert_eq!(integral(3.25), None);
        assert_eq!(integral(f64::INFINITY), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Int(90).to_text(), Some("90".to_string()));
        assert_eq!(Value::text("n/a").to_text(), None);
    }
}
