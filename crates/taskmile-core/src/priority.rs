use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

use crate::error::ValidationError;

/// Urgency of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Needs attention first.
    High,
    /// Regular work.
    #[default]
    Medium,
    /// Can wait.
    Low,
}

impl Priority {
    /// Every priority, most urgent first.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Canonical stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Sort weight; larger is more urgent.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 2,
            Self::Medium => 1,
            Self::Low => 0,
        }
    }

    /// Parse a user-supplied priority token.
    ///
    /// Both the English names and the Portuguese labels used by older data files
    /// are accepted, with or without the accent on "média".
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidPriority`] for any other token.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw.trim().to_lowercase().as_str() {
            "high" | "alta" => Ok(Self::High),
            "medium" | "media" | "média" => Ok(Self::Medium),
            "low" | "baixa" => Ok(Self::Low),
            _ => Err(ValidationError::InvalidPriority(raw.trim().to_owned())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accented_and_plain_media_are_the_same_priority() {
        assert_eq!(Priority::parse("média"), Ok(Priority::Medium));
        assert_eq!(Priority::parse("media"), Ok(Priority::Medium));
        assert_eq!(Priority::parse(" MEDIUM "), Ok(Priority::Medium));
    }

    #[test]
    fn portuguese_labels_map_to_canonical_values() {
        assert_eq!(Priority::parse("Alta"), Ok(Priority::High));
        assert_eq!(Priority::parse("baixa"), Ok(Priority::Low));
    }

    #[test]
    fn unknown_priority_is_rejected() {
        assert_eq!(
            Priority::parse("urgent"),
            Err(ValidationError::InvalidPriority("urgent".into()))
        );
    }

    #[test]
    fn serializes_canonical_name() {
        let json = serde_json::to_string(&Priority::High).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(json, "\"high\"");
        let parsed: Priority = serde_json::from_str("\"média\"").unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(parsed, Priority::Medium);
    }

    #[test]
    fn rank_orders_high_first() {
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
    }
}
