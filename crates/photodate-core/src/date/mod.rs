//! Date reconciliation: compares the year-month a filename leads with
//! against the best available embedded capture date. Pure functions,
//! no I/O; every assessment is derived on demand, never stored.

pub mod filename;

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::exif::{DATE_TIME, DATE_TIME_ORIGINAL};
use crate::record::PhotoRecord;

pub use filename::filename_year_month;

/// A calendar year-month, displayed as the 6-digit `YYYYMM` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Valid range follows the filename convention: 1900-2100, month 1-12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1900..=2100).contains(&year) && (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The year-month a parsed timestamp falls in (no range check).
    pub fn of(dt: &NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse an embedded capture timestamp as published in EXIF display
/// form: `YYYY:MM:DD HH:MM:SS` plus the common separator variants, and
/// date-only values. Malformed input is simply absent.
pub fn parse_capture_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"').trim();

    const FORMATS: &[&str] = &[
        "%Y:%m:%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    // Date-only fallback: midnight
    let date_part = s.split_whitespace().next()?;
    for format in ["%Y:%m:%d", "%Y-%m-%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(date_part, format) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Result of reconciling one record's date sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateAssessment {
    /// The filename's leading year-month token, when present and valid
    pub filename_year_month: Option<YearMonth>,
    /// Best embedded capture date (original-capture preferred)
    pub captured: Option<NaiveDateTime>,
    /// No parseable embedded capture date
    pub missing_captured: bool,
    /// Filename and capture date disagree, or the filename is un-dated
    pub mismatch: bool,
}

/// Reconcile a record's filename token against its embedded capture
/// date. The capture date prefers the original-capture timestamp and
/// falls back to the generic one.
///
/// A filename without a leading year-month is itself a mismatch: the
/// point is to surface every photo whose name cannot be verified
/// against its metadata, and a nameless date cannot be verified.
pub fn assess(record: &PhotoRecord) -> DateAssessment {
    let filename_ym = filename_year_month(&record.name);

    let captured = record
        .field(DATE_TIME_ORIGINAL)
        .or_else(|| record.field(DATE_TIME))
        .and_then(parse_capture_datetime);

    let mismatch = match (filename_ym, captured.as_ref()) {
        (None, _) => true,
        (Some(_), None) => true,
        (Some(ym), Some(dt)) => ym != YearMonth::of(dt),
    };

    DateAssessment {
        filename_year_month: filename_ym,
        missing_captured: captured.is_none(),
        mismatch,
        captured,
    }
}
