//! Parsing of raw SECOM measurement and label lines

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use miette::Diagnostic;
use thiserror::Error;

use crate::entities::Classification;

/// Timestamp layout used by the label file
pub const LABEL_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Year the original timestamps are moved into
pub const TARGET_YEAR: i32 = 2025;

/// Months added to every original timestamp
pub const MONTH_SHIFT: u32 = 2;

/// Minutes between consecutive synthetic timestamps
pub const SYNTHETIC_STEP_MINUTES: i64 = 30;

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum LabelError {
    #[error("label line is empty")]
    #[diagnostic(code(secom::label::empty))]
    Empty,

    #[error("invalid classification '{0}', expected -1 or 1")]
    #[diagnostic(code(secom::label::classification))]
    InvalidClassification(String),
}

/// A parsed label line
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRecord {
    pub classification: Classification,
    /// Timestamp text with quotes removed, as found in the file
    pub raw_timestamp: Option<String>,
    /// Shifted timestamp, `None` when absent or unusable
    pub test_datetime: Option<NaiveDateTime>,
}

/// Split a measurement line into values; `NAN`, infinities and malformed
/// tokens become `None`
pub fn parse_measurement_line(line: &str) -> Vec<Option<f64>> {
    line.split_whitespace()
        .map(|token| {
            if token.eq_ignore_ascii_case("nan") {
                None
            } else {
                token.parse::<f64>().ok().filter(|v| v.is_finite())
            }
        })
        .collect()
}

/// Parse `<classification> ["dd/mm/yyyy HH:MM:SS"]`
pub fn parse_label_line(line: &str) -> Result<LabelRecord, LabelError> {
    let line = line.trim();
    let (first, rest) = match line.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, Some(rest.trim())),
        None => (line, None),
    };

    if first.is_empty() {
        return Err(LabelError::Empty);
    }

    let classification = first
        .parse::<i64>()
        .ok()
        .and_then(|v| Classification::try_from(v).ok())
        .ok_or_else(|| LabelError::InvalidClassification(first.to_string()))?;

    let raw_timestamp = rest
        .map(|r| r.trim_matches('"').to_string())
        .filter(|r| !r.is_empty());

    let test_datetime = raw_timestamp.as_deref().and_then(normalize_timestamp);

    Ok(LabelRecord {
        classification,
        raw_timestamp,
        test_datetime,
    })
}

/// Move an original timestamp into the 2025 production window:
/// year becomes 2025 and the month advances by two, rolling into 2026
/// past December. Returns `None` if the text does not parse or the shifted
/// calendar date does not exist.
pub fn normalize_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let original = NaiveDateTime::parse_from_str(raw.trim(), LABEL_TIMESTAMP_FORMAT).ok()?;

    let mut year = TARGET_YEAR;
    let mut month = original.month() + MONTH_SHIFT;
    if month > 12 {
        month -= 12;
        year += 1;
    }

    NaiveDate::from_ymd_opt(year, month, original.day())?.and_hms_opt(
        original.hour(),
        original.minute(),
        original.second(),
    )
}

/// Anchor of the synthetic timeline (2025-09-15 12:00:00)
pub fn synthetic_base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(TARGET_YEAR, 9, 15)
        .unwrap_or_default()
        .and_hms_opt(12, 0, 0)
        .unwrap_or_default()
}

/// Timestamp for a record without a usable one: base + 30 min × index
pub fn synthetic_timestamp(index: usize) -> NaiveDateTime {
    synthetic_base() + Duration::minutes(SYNTHETIC_STEP_MINUTES * index as i64)
}
