use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use thiserror::Error;

/// Calendar format shared by configuration files and log output.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The single calendar day on which a log's seed may first be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InceptionDate(NaiveDate);

impl InceptionDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Exact day equality; the day before and the day after both fail.
    pub fn is(&self, day: NaiveDate) -> bool {
        self.0 == day
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{input:?} is not a YYYY-MM-DD calendar date")]
pub struct InceptionDateError {
    pub input: String,
}

/// Only the canonical zero-padded form is accepted, so a date compares equal
/// exactly when its text does.
impl FromStr for InceptionDate {
    type Err = InceptionDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InceptionDateError {
            input: s.to_string(),
        };
        let date = NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| invalid())?;
        if date.format(DATE_FORMAT).to_string() != s {
            return Err(invalid());
        }
        Ok(Self(date))
    }
}

impl fmt::Display for InceptionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// A logical log: its stable name doubles as the remote secret identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogIdentity {
    pub name: String,
    pub inception: InceptionDate,
}

impl LogIdentity {
    pub fn new(name: impl Into<String>, inception: InceptionDate) -> Self {
        Self {
            name: name.into(),
            inception,
        }
    }
}
