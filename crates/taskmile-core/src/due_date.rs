use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::ValidationError;

const CONSOLE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[day]/[month]/[year]");
const ISO_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Calendar day a task is due.
///
/// Parsing and formatting only happen at the boundary; internally the value is
/// a plain [`Date`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DueDate(Date);

impl DueDate {
    /// Wrap an already validated date.
    #[must_use]
    pub const fn new(date: Date) -> Self {
        Self(date)
    }

    /// Today's date in UTC.
    #[must_use]
    pub fn today() -> Self {
        Self(OffsetDateTime::now_utc().date())
    }

    /// Underlying calendar date.
    #[must_use]
    pub const fn date(self) -> Date {
        self.0
    }

    /// Parse `DD/MM/YYYY` (console format) or `YYYY-MM-DD` (ISO).
    ///
    /// The console form is checked for length 10 and separators at positions 2
    /// and 5 before the calendar check, so `1/1/2030` is rejected.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidDate`] when neither form matches or the
    /// day does not exist.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let invalid = || ValidationError::InvalidDate(trimmed.to_owned());
        let bytes = trimmed.as_bytes();
        if bytes.len() != 10 {
            return Err(invalid());
        }
        let format = if bytes[2] == b'/' && bytes[5] == b'/' {
            CONSOLE_FORMAT
        } else if bytes[4] == b'-' && bytes[7] == b'-' {
            ISO_FORMAT
        } else {
            return Err(invalid());
        };
        Date::parse(trimmed, format).map(Self).map_err(|_| invalid())
    }

    /// Render in the console format.
    #[must_use]
    pub fn to_console_string(self) -> String {
        let date = self.0;
        format!(
            "{:02}/{:02}/{:04}",
            date.day(),
            u8::from(date.month()),
            date.year()
        )
    }

    /// Render as `YYYY-MM-DD`.
    #[must_use]
    pub fn to_iso_string(self) -> String {
        let date = self.0;
        format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        )
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_console_string())
    }
}

impl FromStr for DueDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Date> for DueDate {
    fn from(date: Date) -> Self {
        Self(date)
    }
}

impl Serialize for DueDate {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&self.to_console_string())
    }
}

impl<'de> Deserialize<'de> for DueDate {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
