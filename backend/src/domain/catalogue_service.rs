//! Catalogue service: categories, genres and titles.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::policy::{Action, Actor, Resource, authorize};
use crate::domain::ports::{
    Catalogue, TaxonomyPersistenceError, TaxonomyRepository, TitlePersistenceError,
    TitleRepository,
};
use crate::domain::{
    Error, NewTaxon, NewTitle, Slug, Taxon, TaxonomyKind, Title, TitleFilter, TitleId, TitlePatch,
};

/// Implements [`Catalogue`] over the taxonomy and title repositories.
#[derive(Clone)]
pub struct CatalogueService<T, R> {
    taxa: Arc<T>,
    titles: Arc<R>,
}

impl<T, R> CatalogueService<T, R> {
    /// Create a new service.
    pub fn new(taxa: Arc<T>, titles: Arc<R>) -> Self {
        Self { taxa, titles }
    }
}

fn map_taxonomy_error(error: TaxonomyPersistenceError) -> Error {
    match error {
        TaxonomyPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("taxonomy repository unavailable: {message}"))
        }
        TaxonomyPersistenceError::Query { message } => {
            Error::internal(format!("taxonomy repository error: {message}"))
        }
        TaxonomyPersistenceError::DuplicateSlug { slug } => Error::field_conflict(
            "slug",
            "duplicate_slug",
            format!("slug {slug} is already in use"),
        ),
        TaxonomyPersistenceError::DuplicateName { name } => Error::field_conflict(
            "name",
            "duplicate_name",
            format!("name {name} is already in use"),
        ),
    }
}

pub(crate) fn map_title_error(error: TitlePersistenceError) -> Error {
    match error {
        TitlePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("title repository unavailable: {message}"))
        }
        TitlePersistenceError::Query { message } => {
            Error::internal(format!("title repository error: {message}"))
        }
        TitlePersistenceError::UnknownCategory { slug } => Error::invalid_field(
            "category",
            "unknown_slug",
            format!("category {slug} does not exist"),
        ),
        TitlePersistenceError::UnknownGenre { slug } => Error::invalid_field(
            "genre",
            "unknown_slug",
            format!("genre {slug} does not exist"),
        ),
    }
}

pub(crate) fn title_not_found(id: TitleId) -> Error {
    Error::not_found(format!("title {id} not found"))
}

#[async_trait]
impl<T, R> Catalogue for CatalogueService<T, R>
where
    T: TaxonomyRepository,
    R: TitleRepository,
{
    async fn list_taxa(
        &self,
        actor: &Actor,
        kind: TaxonomyKind,
        search: Option<String>,
    ) -> Result<Vec<Taxon>, Error> {
        authorize(actor, Action::Read, Resource::taxonomy(kind))?;
        self.taxa
            .list(kind, search)
            .await
            .map_err(map_taxonomy_error)
    }

    async fn create_taxon(&self, actor: &Actor, taxon: NewTaxon) -> Result<Taxon, Error> {
        authorize(actor, Action::Create, Resource::taxonomy(taxon.kind))?;
        let created = self
            .taxa
            .create(&taxon)
            .await
            .map_err(map_taxonomy_error)?;
        info!(kind = %created.kind, slug = %created.slug, "taxonomy entry created");
        Ok(created)
    }

    async fn delete_taxon(
        &self,
        actor: &Actor,
        kind: TaxonomyKind,
        slug: &Slug,
    ) -> Result<(), Error> {
        authorize(actor, Action::Delete, Resource::taxonomy(kind))?;
        if self
            .taxa
            .delete(kind, slug)
            .await
            .map_err(map_taxonomy_error)?
        {
            info!(%kind, %slug, "taxonomy entry deleted");
            Ok(())
        } else {
            Err(Error::not_found(format!("{kind} {slug} not found")))
        }
    }

    async fn list_titles(&self, actor: &Actor, filter: TitleFilter) -> Result<Vec<Title>, Error> {
        authorize(actor, Action::Read, Resource::Title)?;
        self.titles.list(&filter).await.map_err(map_title_error)
    }

    async fn get_title(&self, actor: &Actor, id: TitleId) -> Result<Title, Error> {
        authorize(actor, Action::Read, Resource::Title)?;
        self.titles
            .find_by_id(id)
            .await
            .map_err(map_title_error)?
            .ok_or_else(|| title_not_found(id))
    }

    async fn create_title(&self, actor: &Actor, title: NewTitle) -> Result<Title, Error> {
        authorize(actor, Action::Create, Resource::Title)?;
        let created = self.titles.create(&title).await.map_err(map_title_error)?;
        info!(title_id = %created.id, "title created");
        Ok(created)
    }

    async fn update_title(
        &self,
        actor: &Actor,
        id: TitleId,
        patch: TitlePatch,
    ) -> Result<Title, Error> {
        authorize(actor, Action::Update, Resource::Title)?;
        self.titles
            .update(id, &patch)
            .await
            .map_err(map_title_error)?
            .ok_or_else(|| title_not_found(id))
    }

    async fn delete_title(&self, actor: &Actor, id: TitleId) -> Result<(), Error> {
        authorize(actor, Action::Delete, Resource::Title)?;
        if self.titles.delete(id).await.map_err(map_title_error)? {
            info!(title_id = %id, "title deleted");
            Ok(())
        } else {
            Err(title_not_found(id))
        }
    }
}
