use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh, time-ordered identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s.trim())?))
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                s.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(d: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(d)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

record_id! {
    /// Identifier of a task (UUID v7).
    TaskId
}

record_id! {
    /// Identifier of a category (UUID v7).
    CategoryId
}

/// Name of the user owning tasks and categories.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Owner(String);

impl Owner {
    /// Owner used by the single-user console variant.
    pub const LOCAL: &'static str = "local";

    /// Build an owner from a user name, trimming surrounding whitespace.
    ///
    /// # Errors
    /// Returns [`InvalidOwner`] when the name is empty after trimming.
    pub fn new(name: impl AsRef<str>) -> Result<Self, InvalidOwner> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InvalidOwner);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The single-user owner.
    #[must_use]
    pub fn local() -> Self {
        Self(Self::LOCAL.to_owned())
    }

    /// Borrow the user name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Owner {
    fn default() -> Self {
        Self::local()
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Owner {
    type Err = InvalidOwner;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Owner {
    type Error = InvalidOwner;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Owner> for String {
    fn from(owner: Owner) -> Self {
        owner.0
    }
}

/// Error returned for blank owner names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("owner name must not be empty")]
pub struct InvalidOwner;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_uses_uuid_v7() {
        let id = TaskId::new();
        assert_eq!(id.0.get_version_num(), 7);
    }

    #[test]
    fn category_id_parses_with_surrounding_whitespace() {
        let uuid = Uuid::now_v7();
        let parsed: CategoryId = format!("  {uuid} ")
            .parse()
            .unwrap_or_else(|err| panic!("must parse category id: {err}"));
        assert_eq!(parsed.0, uuid);
    }

    #[test]
    fn owner_is_trimmed_and_rejects_blank_names() {
        let owner = Owner::new("  alice ").unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(owner.as_str(), "alice");
        assert_eq!(Owner::new("   "), Err(InvalidOwner));
    }

    #[test]
    fn owner_deserialization_rejects_blank_names() {
        let parsed: Result<Owner, _> = serde_json::from_str("\" \"");
        assert!(parsed.is_err());
        let parsed: Owner = serde_json::from_str("\"bob\"").unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(parsed.as_str(), "bob");
    }
}
