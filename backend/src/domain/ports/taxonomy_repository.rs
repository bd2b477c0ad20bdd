//! Port abstraction for category and genre persistence.
use async_trait::async_trait;

use crate::domain::{NewTaxon, Slug, Taxon, TaxonomyKind};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by taxonomy repository adapters.
    pub enum TaxonomyPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "taxonomy repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "taxonomy repository query failed: {message}",
        /// Slug already used within the same taxonomy.
        DuplicateSlug { slug: String } => "slug {slug} is already in use",
        /// Name already used within the same taxonomy.
        DuplicateName { name: String } => "name {name} is already in use",
    }
}

/// Category and genre store. Both kinds are kept apart by [`TaxonomyKind`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// Entries of one kind ordered by name, optionally filtered by a
    /// case-insensitive name substring.
    async fn list(
        &self,
        kind: TaxonomyKind,
        search: Option<String>,
    ) -> Result<Vec<Taxon>, TaxonomyPersistenceError>;

    /// Fetch an entry by slug.
    async fn find_by_slug(
        &self,
        kind: TaxonomyKind,
        slug: &Slug,
    ) -> Result<Option<Taxon>, TaxonomyPersistenceError>;

    /// Insert an entry.
    async fn create(&self, taxon: &NewTaxon) -> Result<Taxon, TaxonomyPersistenceError>;

    /// Remove an entry. Categories are detached from their titles, genre
    /// associations are dropped. Returns `false` when nothing matched.
    async fn delete(
        &self,
        kind: TaxonomyKind,
        slug: &Slug,
    ) -> Result<bool, TaxonomyPersistenceError>;
}
