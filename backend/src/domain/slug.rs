//! URL-safe identifiers for categories and genres.
//!
//! Slugs are non-empty, at most 50 characters, and composed of ASCII
//! letters, digits, hyphens and underscores.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum slug length.
pub const SLUG_MAX: usize = 50;

/// Validation errors raised by [`Slug::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugValidationError {
    Empty,
    TooLong { max: usize },
    InvalidCharacters,
}

impl fmt::Display for SlugValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "slug must not be empty"),
            Self::TooLong { max } => write!(f, "slug must be at most {max} characters"),
            Self::InvalidCharacters => write!(
                f,
                "slug may only contain letters, digits, hyphens or underscores"
            ),
        }
    }
}

impl SlugValidationError {
    /// Stable machine-readable code reported in error details.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Empty => "blank",
            Self::TooLong { .. } => "too_long",
            Self::InvalidCharacters => "invalid_characters",
        }
    }
}

impl std::error::Error for SlugValidationError {}

fn has_allowed_slug_chars(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

/// Validated slug.
///
/// # Examples
/// ```
/// use yamdb::domain::Slug;
///
/// assert!(Slug::new("sci-fi").is_ok());
/// assert!(Slug::new("sci fi").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate and construct a [`Slug`].
    pub fn new(value: impl Into<String>) -> Result<Self, SlugValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(SlugValidationError::Empty);
        }
        if value.chars().count() > SLUG_MAX {
            return Err(SlugValidationError::TooLong { max: SLUG_MAX });
        }
        if !has_allowed_slug_chars(&value) {
            return Err(SlugValidationError::InvalidCharacters);
        }
        Ok(Self(value))
    }

    /// Borrow the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
