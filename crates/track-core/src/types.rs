//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty after trimming.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The value contained a control character (newline, tab, escape...).
    #[error("{field} contains a control character: {value:?}")]
    ControlCharacter { field: &'static str, value: String },
}

/// Trims `value` and rejects control characters.
fn normalize(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::ControlCharacter {
            field,
            value: trimmed.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Generates a validated, trimmed label newtype with common trait implementations.
macro_rules! define_label {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new label after trimming and validation.
            pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
                let value = normalize(value.as_ref(), $field_name)?;
                if value.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(value))
            }

            /// Returns the label as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(label: $name) -> Self {
                label.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_label!(
    /// A validated activity name.
    ///
    /// Activity names are trimmed and must be non-empty.
    ActivityName, "activity name"
);

define_label!(
    /// A validated category label (e.g., "work", "study").
    ///
    /// Comparison is case-sensitive: `Work` and `work` are different categories.
    Category, "category"
);

impl Category {
    /// Label used for sessions recorded without a category.
    pub const UNCATEGORIZED: &'static str = "uncategorized";

    /// Parses an optional category, treating blank input as "no category".
    pub fn parse_optional(value: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match value {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => Self::new(raw).map(Some),
        }
    }
}
