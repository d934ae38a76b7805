//! Due-date codec for the fixed `MM-DD-YY` format.
//!
//! Two-digit years always resolve to the 2000s (`25` is 2025, `99` is 2099),
//! which keeps calendar order identical to the lexical order of the raw text.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::error::{Result, TaskError};

const CENTURY: i32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DueDate(NaiveDate);

impl DueDate {
    /// Parses `text` strictly: two zero-padded digits each for month, day and
    /// year, separated by `-`, and naming a real calendar day.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || TaskError::InvalidDateFormat {
            input: text.to_string(),
        };

        let bytes = text.as_bytes();
        if bytes.len() != 8 || bytes[2] != b'-' || bytes[5] != b'-' {
            return Err(invalid());
        }

        let month = two_digits(&bytes[0..2]).ok_or_else(invalid)?;
        let day = two_digits(&bytes[3..5]).ok_or_else(invalid)?;
        let year = two_digits(&bytes[6..8]).ok_or_else(invalid)?;

        NaiveDate::from_ymd_opt(CENTURY + year as i32, month, day)
            .map(DueDate)
            .ok_or_else(invalid)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

fn two_digits(pair: &[u8]) -> Option<u32> {
    match pair {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => None,
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:02}-{:02}",
            self.0.month(),
            self.0.day(),
            self.0.year() - CENTURY
        )
    }
}

/// Ordering key for a stored task. Dates read back from disk are not
/// validated, so a key may hold text that never parsed; those sort after
/// every real date, ordered by their raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Due(DueDate),
    Unparsed(String),
}

impl SortKey {
    pub fn for_text(text: &str) -> Self {
        match DueDate::parse(text) {
            Ok(date) => SortKey::Due(date),
            Err(_) => SortKey::Unparsed(text.to_string()),
        }
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self, SortKey::Unparsed(_))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Due(a), SortKey::Due(b)) => a.cmp(b),
            (SortKey::Due(_), SortKey::Unparsed(_)) => Ordering::Less,
            (SortKey::Unparsed(_), SortKey::Due(_)) => Ordering::Greater,
            (SortKey::Unparsed(a), SortKey::Unparsed(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
