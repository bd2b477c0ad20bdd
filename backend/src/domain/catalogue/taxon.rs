//! Categories and genres.

use std::fmt;

use crate::domain::Slug;

use super::CatalogueName;

/// Which taxonomy an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxonomyKind {
    /// At most one per title; titles keep existing when it is removed.
    Category,
    /// Any number per title.
    Genre,
}

impl TaxonomyKind {
    /// Stable lowercase name used in storage and messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Genre => "genre",
        }
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaxonomyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(Self::Category),
            "genre" => Ok(Self::Genre),
            other => Err(format!("unknown taxonomy kind: {other}")),
        }
    }
}

/// Store-assigned identifier of a category or genre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaxonId(i64);

impl TaxonId {
    /// Wrap a raw store identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

/// A category or genre. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxon {
    pub id: TaxonId,
    pub kind: TaxonomyKind,
    pub name: CatalogueName,
    pub slug: Slug,
}

/// Values required to create a category or genre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaxon {
    pub kind: TaxonomyKind,
    pub name: CatalogueName,
    pub slug: Slug,
}
