use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::id::{CategoryId, Owner};

/// Display color of a category, stored as `#rrggbb`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Color assigned when none is chosen.
    pub const DEFAULT: &'static str = "#007bff";

    /// Parse a `#rrggbb` hex color; hex digits are lowercased.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidColor`] for anything else.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let valid = trimmed.len() == 7
            && trimmed.starts_with('#')
            && trimmed[1..].chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(ValidationError::InvalidColor(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Borrow the hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// User-owned label assignable to tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Identifier of the category.
    pub id: CategoryId,
    /// Owner of the category.
    pub owner: Owner,
    /// Display name.
    pub name: String,
    /// Display color.
    #[serde(default)]
    pub color: Color,
}

impl Category {
    /// Build a category with a fresh id, validating the name.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyCategoryName`] when the trimmed name is empty.
    pub fn new(owner: Owner, name: &str, color: Color) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyCategoryName);
        }
        Ok(Self {
            id: CategoryId::new(),
            owner,
            name: name.to_owned(),
            color,
        })
    }
}

/// Categories created for every new account: name and color.
pub const DEFAULT_CATEGORIES: [(&str, &str); 4] = [
    ("Work", "#007bff"),
    ("Personal", "#28a745"),
    ("Studies", "#ffc107"),
    ("Urgent", "#dc3545"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_accepts_hex_and_normalizes_case() {
        let color = Color::parse("#DC3545").unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(color.as_str(), "#dc3545");
    }

    #[test]
    fn color_rejects_malformed_values() {
        for raw in ["blue", "#12345", "#1234567", "007bff#", "#zzzzzz"] {
            assert!(Color::parse(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn default_color_is_blue() {
        assert_eq!(Color::default().as_str(), "#007bff");
    }

    #[test]
    fn category_name_is_trimmed_and_required() {
        let owner = Owner::local();
        let cat = Category::new(owner.clone(), "  Home ", Color::default())
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(cat.name, "Home");
        assert_eq!(
            Category::new(owner, "  ", Color::default()),
            Err(ValidationError::EmptyCategoryName)
        );
    }

    #[test]
    fn default_category_colors_are_valid() {
        for (_, color) in DEFAULT_CATEGORIES {
            assert!(Color::parse(color).is_ok());
        }
    }
}
