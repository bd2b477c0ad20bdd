//! Catalogue domain types: categories, genres and titles.
//!
//! Categories and genres share one shape and differ only by
//! [`TaxonomyKind`]. A title's rating is never stored; it is derived from the
//! review scores each time a title is read.

use std::fmt;

use serde::{Deserialize, Serialize};

mod rating;
mod taxon;
mod title;


pub use rating::Rating;
pub use taxon::{NewTaxon, Taxon, TaxonId, TaxonomyKind};
pub use title::{NewTitle, Title, TitleFilter, TitleId, TitlePatch};

/// Maximum length of category, genre and title names.
pub const CATALOGUE_NAME_MAX: usize = 256;

/// Validation errors returned by catalogue constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueValidationError {
    EmptyName,
    NameTooLong { max: usize },
}

impl fmt::Display for CatalogueValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
        }
    }
}

impl CatalogueValidationError {
    /// Stable machine-readable code reported in error details.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyName => "blank",
            Self::NameTooLong { .. } => "too_long",
        }
    }
}

impl std::error::Error for CatalogueValidationError {}

/// Display name of a category, genre or title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CatalogueName(String);

impl CatalogueName {
    /// Validate and construct a name; surrounding whitespace is trimmed.
    pub fn new(value: impl AsRef<str>) -> Result<Self, CatalogueValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CatalogueValidationError::EmptyName);
        }
        if trimmed.chars().count() > CATALOGUE_NAME_MAX {
            return Err(CatalogueValidationError::NameTooLong {
                max: CATALOGUE_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CatalogueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CatalogueName> for String {
    fn from(value: CatalogueName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CatalogueName {
    type Error = CatalogueValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Case-insensitive substring match used by name searches.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
