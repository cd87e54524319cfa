//! Scalar parsers for the provider's string-typed fields.
//!
//! Everything the API sends arrives as text. These helpers turn that text into
//! typed values without failing: a value that does not parse comes back as
//! `None` and the caller decides what that means.

use chrono::NaiveTime;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

/// `last_updated_ms` value for a trip whose vehicle is not reporting.
pub const STALE: i64 = -1;

lazy_static! {
    static ref CLOCK_TIME_REGEX: Regex = Regex::new(r"^\s*([0-9]{1,2}):?([0-5][0-9])\s*$").unwrap();
}

/// Parses an integer, accepting surrounding whitespace and whole-valued
/// decimals such as `"12.0"`.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }

    parse_float(raw)
        .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
        .map(|v| v as i64)
}

pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_boolean(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Parses a wall-clock time such as `"9:05"`, `"0905"` or `" 25:30 "`.
///
/// Hours past 23 are wrapped modulo 24, since the provider emits times like
/// `"24:15"` for trips that run past midnight. Blank or malformed input
/// yields `None`.
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    if raw.trim().is_empty() {
        return None;
    }

    let caps = CLOCK_TIME_REGEX.captures(raw)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;

    NaiveTime::from_hms_opt(hour % 24, minute, 0)
}

/// Converts an elapsed time in decimal minutes into milliseconds.
///
/// A negative age means the vehicle is not currently reporting and maps to
/// [`STALE`].
pub fn parse_elapsed_minutes_to_ms(raw: &str) -> Option<i64> {
    let minutes = parse_float(raw)?;

    if minutes < 0.0 {
        return Some(STALE);
    }

    Some((minutes * 60_000.0).floor() as i64)
}

/// A provider error code with its human-readable meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode {
    pub code: Option<i64>,
    pub message: String,
}

impl From<ErrorCode> for Error {
    fn from(value: ErrorCode) -> Self {
        Error::Upstream {
            code: value.code,
            message: value.message,
        }
    }
}

pub fn lookup_error_code(raw: &str) -> ErrorCode {
    let code = parse_integer(raw);

    let message = match code {
        Some(1) => "Invalid API key".to_string(),
        Some(2) => "Unable to query data source".to_string(),
        Some(10) => "Invalid stop number".to_string(),
        Some(11) => "Invalid route number".to_string(),
        Some(12) => "Stop does not service route".to_string(),
        Some(n) => format!("Unknown error code: {n}"),
        None => format!("Unknown error code: {}", raw.trim()),
    };

    ErrorCode { code, message }
}

/// Title-cases an all-caps stop name: `"RIDEAU CENTRE"` becomes `"Rideau Centre"`.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut at_word_start = true;

    for c in raw.trim().chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_word_start = !c.is_alphanumeric();
    }

    out
}

/// Validates a caller-supplied stop number.
///
/// # Errors
///
/// Returns [`Error::Validation`] if `raw` is not an integer.
pub fn require_stop_number(raw: &str) -> Result<i64> {
    raw.trim().parse::<i64>().map_err(|_| {
        Error::Validation(format!(
            "Missing or invalid stop number: {raw} - expected integer."
        ))
    })
}

/// Validates a caller-supplied route number.
///
/// # Errors
///
/// Returns [`Error::Validation`] if `raw` is not an integer.
pub fn require_route_number(raw: &str) -> Result<i64> {
    raw.trim().parse::<i64>().map_err(|_| {
        Error::Validation(format!(
            "Missing or invalid route number: {raw} - expected integer."
        ))
    })
}
