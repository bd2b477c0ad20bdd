//! Titles: the works being reviewed.

use crate::domain::Slug;

use super::{CatalogueName, Rating, Taxon, contains_ignore_case};

/// Store-assigned title identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TitleId(i64);

impl TitleId {
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

impl std::fmt::Display for TitleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A title as read from the catalogue, with its derived rating.
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub id: TitleId,
    pub name: CatalogueName,
    pub year: i32,
    pub description: Option<String>,
    pub category: Option<Taxon>,
    pub genres: Vec<Taxon>,
    pub rating: Rating,
}

/// Values required to create a title. Taxonomy entries are referenced by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTitle {
    pub name: CatalogueName,
    pub year: i32,
    pub description: Option<String>,
    pub category: Option<Slug>,
    pub genres: Vec<Slug>,
}

/// Partial update of a title.
///
/// Nested options distinguish "leave unchanged" (`None`) from "clear"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitlePatch {
    pub name: Option<CatalogueName>,
    pub year: Option<i32>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<Slug>>,
    pub genres: Option<Vec<Slug>>,
}

/// Listing filters; all present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFilter {
    /// Case-insensitive substring of the title name.
    pub name: Option<String>,
    /// Exact category slug.
    pub category: Option<Slug>,
    /// Exact genre slug; matches titles carrying that genre among others.
    pub genre: Option<Slug>,
    /// Exact release year.
    pub year: Option<i32>,
}

impl TitleFilter {
    /// Whether `title` satisfies every present filter.
    #[must_use]
    pub fn matches(&self, title: &Title) -> bool {
        let name_ok = self
            .name
            .as_deref()
            .is_none_or(|needle| contains_ignore_case(title.name.as_str(), needle));
        let category_ok = self.category.as_ref().is_none_or(|slug| {
            title
                .category
                .as_ref()
                .is_some_and(|category| &category.slug == slug)
        });
        let genre_ok = self
            .genre
            .as_ref()
            .is_none_or(|slug| title.genres.iter().any(|genre| &genre.slug == slug));
        let year_ok = self.year.is_none_or(|year| title.year == year);
        name_ok && category_ok && genre_ok && year_ok
    }
}
