//! PostgreSQL-backed [`TaxonomyRepository`] implementation using Diesel ORM.
//!
//! Deleting a category relies on `ON DELETE SET NULL` for `titles.category_id`;
//! deleting a genre relies on `ON DELETE CASCADE` for `title_genres`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TaxonomyPersistenceError, TaxonomyRepository};
use crate::domain::{NewTaxon, Slug, Taxon, TaxonomyKind};

use super::diesel_error_mapping::{DbFailure, classify, contains_pattern, pool_message};
use super::models::{NewTaxonRow, TaxonRow};
use super::pool::{DbPool, PoolError};
use super::schema::taxa;

/// Diesel-backed category and genre store.
#[derive(Clone)]
pub struct DieselTaxonomyRepository {
    pool: DbPool,
}

impl DieselTaxonomyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TaxonomyPersistenceError {
    TaxonomyPersistenceError::connection(pool_message(error))
}

fn map_diesel_error(
    error: diesel::result::Error,
    attempted: Option<&NewTaxon>,
) -> TaxonomyPersistenceError {
    match (classify(error), attempted) {
        (DbFailure::UniqueViolation(violation), Some(taxon))
            if violation.is("taxa_kind_slug_key") =>
        {
            TaxonomyPersistenceError::duplicate_slug(taxon.slug.as_str())
        }
        (DbFailure::UniqueViolation(violation), Some(taxon))
            if violation.is("taxa_kind_name_key") =>
        {
            TaxonomyPersistenceError::duplicate_name(taxon.name.as_str())
        }
        (DbFailure::Connection(message), _) => TaxonomyPersistenceError::connection(message),
        (DbFailure::UniqueViolation(_) | DbFailure::ForeignKeyViolation(_), _) => {
            TaxonomyPersistenceError::query("constraint violation")
        }
        (DbFailure::Query(message), _) => TaxonomyPersistenceError::query(message),
    }
}

fn read_error(error: diesel::result::Error) -> TaxonomyPersistenceError {
    map_diesel_error(error, None)
}

fn to_domain(row: TaxonRow) -> Result<Taxon, TaxonomyPersistenceError> {
    Taxon::try_from(row).map_err(TaxonomyPersistenceError::query)
}

#[async_trait]
impl TaxonomyRepository for DieselTaxonomyRepository {
    async fn list(
        &self,
        kind: TaxonomyKind,
        search: Option<String>,
    ) -> Result<Vec<Taxon>, TaxonomyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = taxa::table
            .filter(taxa::kind.eq(kind.as_str()))
            .select(TaxonRow::as_select())
            .order_by((taxa::name, taxa::id))
            .into_boxed();
        if let Some(needle) = search.as_deref() {
            query = query.filter(taxa::name.ilike(contains_pattern(needle)));
        }
        let rows: Vec<TaxonRow> = query.load(&mut conn).await.map_err(read_error)?;
        rows.into_iter().map(to_domain).collect()
    }

    async fn find_by_slug(
        &self,
        kind: TaxonomyKind,
        slug: &Slug,
    ) -> Result<Option<Taxon>, TaxonomyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TaxonRow> = taxa::table
            .filter(taxa::kind.eq(kind.as_str()))
            .filter(taxa::slug.eq(slug.as_str()))
            .select(TaxonRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(read_error)?;
        row.map(to_domain).transpose()
    }

    async fn create(&self, taxon: &NewTaxon) -> Result<Taxon, TaxonomyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewTaxonRow {
            kind: taxon.kind.as_str(),
            name: taxon.name.as_str(),
            slug: taxon.slug.as_str(),
        };
        let row: TaxonRow = diesel::insert_into(taxa::table)
            .values(&new_row)
            .returning(TaxonRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(taxon)))?;
        to_domain(row)
    }

    async fn delete(
        &self,
        kind: TaxonomyKind,
        slug: &Slug,
    ) -> Result<bool, TaxonomyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            taxa::table
                .filter(taxa::kind.eq(kind.as_str()))
                .filter(taxa::slug.eq(slug.as_str())),
        )
        .execute(&mut conn)
        .await
        .map_err(read_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CatalogueName;
    use crate::outbound::persistence::diesel_error_mapping::test_support::violation;
    use diesel::result::DatabaseErrorKind;
    use rstest::{fixture, rstest};

    #[fixture]
    fn drama() -> NewTaxon {
        NewTaxon {
            kind: TaxonomyKind::Genre,
            name: CatalogueName::new("Drama").expect("name"),
            slug: Slug::new("drama").expect("slug"),
        }
    }

    #[rstest]
    fn slug_constraint_maps_to_duplicate_slug(drama: NewTaxon) {
        let error = map_diesel_error(
            violation(DatabaseErrorKind::UniqueViolation, "taxa_kind_slug_key"),
            Some(&drama),
        );
        assert_eq!(error, TaxonomyPersistenceError::duplicate_slug("drama"));
    }

    #[rstest]
    fn name_constraint_maps_to_duplicate_name(drama: NewTaxon) {
        let error = map_diesel_error(
            violation(DatabaseErrorKind::UniqueViolation, "taxa_kind_name_key"),
            Some(&drama),
        );
        assert_eq!(error, TaxonomyPersistenceError::duplicate_name("Drama"));
    }

    #[rstest]
    fn unknown_constraints_map_to_query_errors(drama: NewTaxon) {
        let error = map_diesel_error(
            violation(DatabaseErrorKind::UniqueViolation, "taxa_pkey"),
            Some(&drama),
        );
        assert!(matches!(error, TaxonomyPersistenceError::Query { .. }));
    }
}
