//! Monthly period keys.
//!
//! A [`PeriodKey`] encodes a calendar month as `year * 100 + month` and is the
//! join key between the return series and the factor table.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar month encoded as `year * 100 + month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodKey(u32);

/// Error returned when a value cannot be read as a period key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid period '{0}': expected YYYYMM, YYYY-MM or YYYY/MM")]
pub struct ParsePeriodError(pub String);

impl PeriodKey {
    /// Build a key from a year and a 1-based month.
    pub const fn new(year: u32, month: u32) -> Option<Self> {
        if month >= 1 && month <= 12 && year > 0 && year <= 9999 {
            Some(Self(year * 100 + month))
        } else {
            None
        }
    }

    /// Key of the month containing `date`. The day is discarded.
    pub fn from_date<D: Datelike>(date: &D) -> Option<Self> {
        u32::try_from(date.year())
            .ok()
            .and_then(|year| Self::new(year, date.month()))
    }

    /// Decode a raw `YYYYMM` integer.
    pub fn from_yyyymm(raw: i64) -> Option<Self> {
        let raw = u32::try_from(raw).ok()?;
        Self::new(raw / 100, raw % 100)
    }

    /// Calendar year.
    pub const fn year(&self) -> u32 {
        self.0 / 100
    }

    /// Calendar month, 1 through 12.
    pub const fn month(&self) -> u32 {
        self.0 % 100
    }

    /// Raw `YYYYMM` value.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for PeriodKey {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParsePeriodError(s.to_string());

        let (year, month) = match trimmed.split_once(['-', '/']) {
            Some((year, month)) => (year, month),
            None if trimmed.len() == 6 => trimmed.split_at(4),
            None => return Err(err()),
        };

        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(err());
        }
        let year: u32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}
