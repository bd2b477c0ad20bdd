//! Driving port for categories, genres and titles.

use async_trait::async_trait;

use crate::domain::policy::Actor;
use crate::domain::{
    Error, NewTaxon, NewTitle, Slug, Taxon, TaxonomyKind, Title, TitleFilter, TitleId, TitlePatch,
};

/// Domain use-case port for the catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Catalogue: Send + Sync {
    /// Categories or genres ordered by name, optionally filtered by name.
    async fn list_taxa(
        &self,
        actor: &Actor,
        kind: TaxonomyKind,
        search: Option<String>,
    ) -> Result<Vec<Taxon>, Error>;

    /// Create a category or genre.
    async fn create_taxon(&self, actor: &Actor, taxon: NewTaxon) -> Result<Taxon, Error>;

    /// Delete a category or genre by slug.
    async fn delete_taxon(&self, actor: &Actor, kind: TaxonomyKind, slug: &Slug)
    -> Result<(), Error>;

    /// Titles matching the filter, with derived ratings.
    async fn list_titles(&self, actor: &Actor, filter: TitleFilter) -> Result<Vec<Title>, Error>;

    /// Fetch one title.
    async fn get_title(&self, actor: &Actor, id: TitleId) -> Result<Title, Error>;

    /// Create a title.
    async fn create_title(&self, actor: &Actor, title: NewTitle) -> Result<Title, Error>;

    /// Partially update a title.
    async fn update_title(
        &self,
        actor: &Actor,
        id: TitleId,
        patch: TitlePatch,
    ) -> Result<Title, Error>;

    /// Delete a title and its reviews.
    async fn delete_title(&self, actor: &Actor, id: TitleId) -> Result<(), Error>;
}
