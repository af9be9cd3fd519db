//! Date validation for fetched records.
//!
//! Drops records whose date is missing, a placeholder, unparsable under
//! `dd/mm/yyyy`, or outside a plausible year range. Drops are counted, never fatal.

use crate::domain::Record;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Textual date format used by every feed.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Placeholder values the remote emits instead of a real date.
pub const SENTINEL_DATES: &[&str] = &["01/01/0001", "NaT", "nan", "None", "null"];

pub const MIN_PLAUSIBLE_YEAR: i32 = 1900;
pub const MAX_PLAUSIBLE_YEAR: i32 = 9999;

/// Why a record was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Date field absent or JSON null.
    Missing,
    /// Empty string or a known placeholder.
    Sentinel,
    /// Not a `dd/mm/yyyy` date (or not a string at all).
    Unparsable,
    /// Parses, but the year is outside the plausible range.
    Implausible,
}

/// Per-reason drop counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropCounts {
    pub missing: usize,
    pub sentinel: usize,
    pub unparsable: usize,
    pub implausible: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.missing + self.sentinel + self.unparsable + self.implausible
    }

    pub fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::Missing => self.missing += 1,
            DropReason::Sentinel => self.sentinel += 1,
            DropReason::Unparsable => self.unparsable += 1,
            DropReason::Implausible => self.implausible += 1,
        }
    }
}

/// Records that passed validation, in input order, and what was dropped.
#[derive(Debug, Clone, Default)]
pub struct Validated {
    pub records: Vec<Record>,
    pub dropped: DropCounts,
}

/// Parse a date under the fixed feed format, without plausibility checks.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

/// Classify one date value.
pub fn check_date(value: Option<&Value>) -> Result<NaiveDate, DropReason> {
    let text = match value {
        None | Some(Value::Null) => return Err(DropReason::Missing),
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(DropReason::Unparsable),
    };

    if text.trim().is_empty() || SENTINEL_DATES.contains(&text) {
        return Err(DropReason::Sentinel);
    }

    let date = parse_date(text).ok_or(DropReason::Unparsable)?;
    if !(MIN_PLAUSIBLE_YEAR..=MAX_PLAUSIBLE_YEAR).contains(&date.year()) {
        return Err(DropReason::Implausible);
    }
    Ok(date)
}

/// Keep the records whose `date_field` holds a plausible, parseable date.
pub fn validate_records(records: Vec<Record>, date_field: &str) -> Validated {
    let mut out = Validated {
        records: Vec::with_capacity(records.len()),
        dropped: DropCounts::default(),
    };

    for record in records {
        match check_date(record.get(date_field)) {
            Ok(_) => out.records.push(record),
            Err(reason) => out.dropped.record(reason),
        }
    }

    out
}
