//! PostgreSQL-backed [`TitleRepository`] implementation using Diesel ORM.
//!
//! Reads hydrate titles with their category, genres and rating inside one
//! read-only `REPEATABLE READ` transaction, so every SELECT shares the
//! snapshot taken by the first one. The rating is computed from the review
//! scores read in that snapshot.

use std::collections::BTreeMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{TitlePersistenceError, TitleRepository};
use crate::domain::{
    CatalogueName, NewTitle, Rating, Score, Slug, Taxon, TaxonomyKind, Title, TitleFilter,
    TitleId, TitlePatch,
};

use super::diesel_error_mapping::{DbFailure, classify, contains_pattern, pool_message};
use super::models::{NewTitleRow, TaxonRow, TitleChangeset, TitleGenreRow, TitleRow};
use super::pool::{DbPool, PoolError};
use super::schema::{reviews, taxa, title_genres, titles};

/// Diesel-backed title store.
#[derive(Clone)]
pub struct DieselTitleRepository {
    pool: DbPool,
}

impl DieselTitleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a title transaction: either the database failed or the
/// request referenced something that does not exist.
#[derive(Debug)]
enum TitleTxError {
    Diesel(diesel::result::Error),
    Rejected(TitlePersistenceError),
}

impl From<diesel::result::Error> for TitleTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> TitlePersistenceError {
    TitlePersistenceError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> TitlePersistenceError {
    match classify(error) {
        DbFailure::Connection(message) => TitlePersistenceError::connection(message),
        DbFailure::UniqueViolation(_) | DbFailure::ForeignKeyViolation(_) => {
            TitlePersistenceError::query("constraint violation")
        }
        DbFailure::Query(message) => TitlePersistenceError::query(message),
    }
}

fn map_tx_error(error: TitleTxError) -> TitlePersistenceError {
    match error {
        TitleTxError::Diesel(error) => map_diesel_error(error),
        TitleTxError::Rejected(error) => error,
    }
}

async fn resolve_taxon(
    conn: &mut AsyncPgConnection,
    kind: TaxonomyKind,
    slug: &Slug,
) -> Result<Option<i64>, diesel::result::Error> {
    taxa::table
        .filter(taxa::kind.eq(kind.as_str()))
        .filter(taxa::slug.eq(slug.as_str()))
        .select(taxa::id)
        .first(conn)
        .await
        .optional()
}

async fn resolve_category(
    conn: &mut AsyncPgConnection,
    slug: &Slug,
) -> Result<i64, TitleTxError> {
    resolve_taxon(conn, TaxonomyKind::Category, slug)
        .await?
        .ok_or_else(|| {
            TitleTxError::Rejected(TitlePersistenceError::unknown_category(slug.as_str()))
        })
}

async fn resolve_genres(
    conn: &mut AsyncPgConnection,
    slugs: &[Slug],
) -> Result<Vec<i64>, TitleTxError> {
    let mut ids = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let id = resolve_taxon(conn, TaxonomyKind::Genre, slug)
            .await?
            .ok_or_else(|| {
                TitleTxError::Rejected(TitlePersistenceError::unknown_genre(slug.as_str()))
            })?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

async fn replace_genres(
    conn: &mut AsyncPgConnection,
    title_id: i64,
    genre_ids: &[i64],
) -> Result<(), diesel::result::Error> {
    diesel::delete(title_genres::table.filter(title_genres::title_id.eq(title_id)))
        .execute(conn)
        .await?;
    if genre_ids.is_empty() {
        return Ok(());
    }
    let rows: Vec<TitleGenreRow> = genre_ids
        .iter()
        .map(|&genre_id| TitleGenreRow { title_id, genre_id })
        .collect();
    diesel::insert_into(title_genres::table)
        .values(&rows)
        .execute(conn)
        .await?;
    Ok(())
}

fn rejected(message: String) -> TitleTxError {
    TitleTxError::Rejected(TitlePersistenceError::query(message))
}

/// Attach category, genres and rating to raw title rows, keeping their order.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<TitleRow>,
) -> Result<Vec<Title>, TitleTxError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let category_ids: Vec<i64> = rows.iter().filter_map(|row| row.category_id).collect();

    let categories: Vec<TaxonRow> = taxa::table
        .filter(taxa::id.eq_any(&category_ids))
        .select(TaxonRow::as_select())
        .load(conn)
        .await?;
    let tagged: Vec<(i64, TaxonRow)> = title_genres::table
        .inner_join(taxa::table)
        .filter(title_genres::title_id.eq_any(&ids))
        .select((title_genres::title_id, TaxonRow::as_select()))
        .order_by((taxa::name, taxa::id))
        .load(conn)
        .await?;
    let scores: Vec<(i64, i16)> = reviews::table
        .filter(reviews::title_id.eq_any(&ids))
        .select((reviews::title_id, reviews::score))
        .load(conn)
        .await?;

    let mut categories_by_id = BTreeMap::new();
    for row in categories {
        let taxon = Taxon::try_from(row).map_err(rejected)?;
        categories_by_id.insert(taxon.id.get(), taxon);
    }
    let mut genres_by_title: BTreeMap<i64, Vec<Taxon>> = BTreeMap::new();
    for (title_id, row) in tagged {
        let taxon = Taxon::try_from(row).map_err(rejected)?;
        genres_by_title.entry(title_id).or_default().push(taxon);
    }
    let mut scores_by_title: BTreeMap<i64, Vec<Score>> = BTreeMap::new();
    for (title_id, score) in scores {
        let score = Score::new(i64::from(score))
            .map_err(|err| rejected(format!("stored score is invalid: {err}")))?;
        scores_by_title.entry(title_id).or_default().push(score);
    }

    rows.into_iter()
        .map(|row| -> Result<Title, TitleTxError> {
            Ok(Title {
                id: TitleId::new(row.id),
                name: CatalogueName::new(&row.name).map_err(|err| {
                    rejected(format!("stored title {} has an invalid name: {err}", row.id))
                })?,
                year: row.year,
                description: row.description,
                category: row
                    .category_id
                    .and_then(|id| categories_by_id.get(&id))
                    .cloned(),
                genres: genres_by_title.remove(&row.id).unwrap_or_default(),
                rating: Rating::from_scores(scores_by_title.remove(&row.id).unwrap_or_default()),
            })
        })
        .collect()
}

async fn find_row(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> Result<Option<TitleRow>, diesel::result::Error> {
    titles::table
        .find(id)
        .select(TitleRow::as_select())
        .first(conn)
        .await
        .optional()
}

async fn list_rows(
    conn: &mut AsyncPgConnection,
    filter: &TitleFilter,
) -> Result<Vec<TitleRow>, diesel::result::Error> {
    let mut query = titles::table
        .select(TitleRow::as_select())
        .order_by((titles::name, titles::id))
        .into_boxed();
    if let Some(needle) = filter.name.as_deref() {
        query = query.filter(titles::name.ilike(contains_pattern(needle)));
    }
    if let Some(year) = filter.year {
        query = query.filter(titles::year.eq(year));
    }
    if let Some(slug) = &filter.category {
        let Some(category_id) = resolve_taxon(conn, TaxonomyKind::Category, slug).await? else {
            return Ok(Vec::new());
        };
        query = query.filter(titles::category_id.eq(category_id));
    }
    if let Some(slug) = &filter.genre {
        let Some(genre_id) = resolve_taxon(conn, TaxonomyKind::Genre, slug).await? else {
            return Ok(Vec::new());
        };
        let tagged: Vec<i64> = title_genres::table
            .filter(title_genres::genre_id.eq(genre_id))
            .select(title_genres::title_id)
            .load(conn)
            .await?;
        query = query.filter(titles::id.eq_any(tagged));
    }
    query.load(conn).await
}

#[async_trait]
impl TitleRepository for DieselTitleRepository {
    async fn list(&self, filter: &TitleFilter) -> Result<Vec<Title>, TitlePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result: Result<Vec<Title>, TitleTxError> = conn
            .build_transaction()
            .read_only()
            .repeatable_read()
            .run(|conn| {
                async move {
                    let rows = list_rows(conn, filter).await?;
                    hydrate(conn, rows).await
                }
                .scope_boxed()
            })
            .await;
        result.map_err(map_tx_error)
    }

    async fn find_by_id(&self, id: TitleId) -> Result<Option<Title>, TitlePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result: Result<Option<Title>, TitleTxError> = conn
            .build_transaction()
            .read_only()
            .repeatable_read()
            .run(|conn| {
                async move {
                    let rows = find_row(conn, id.get()).await?.into_iter().collect();
                    Ok(hydrate(conn, rows).await?.pop())
                }
                .scope_boxed()
            })
            .await;
        result.map_err(map_tx_error)
    }

    async fn create(&self, title: &NewTitle) -> Result<Title, TitlePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result: Result<Title, TitleTxError> = conn
            .transaction(|conn| {
                async move {
                    let category_id = match &title.category {
                        Some(slug) => Some(resolve_category(conn, slug).await?),
                        None => None,
                    };
                    let genre_ids = resolve_genres(conn, &title.genres).await?;
                    let new_row = NewTitleRow {
                        name: title.name.as_str(),
                        year: title.year,
                        description: title.description.as_deref(),
                        category_id,
                    };
                    let row: TitleRow = diesel::insert_into(titles::table)
                        .values(&new_row)
                        .returning(TitleRow::as_returning())
                        .get_result(conn)
                        .await?;
                    debug!(title_id = row.id, genres = genre_ids.len(), "inserted title");
                    replace_genres(conn, row.id, &genre_ids).await?;
                    hydrate(conn, vec![row])
                        .await?
                        .pop()
                        .ok_or_else(|| rejected("inserted title could not be read back".to_owned()))
                }
                .scope_boxed()
            })
            .await;
        result.map_err(map_tx_error)
    }

    async fn update(
        &self,
        id: TitleId,
        patch: &TitlePatch,
    ) -> Result<Option<Title>, TitlePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result: Result<Option<Title>, TitleTxError> = conn
            .transaction(|conn| {
                async move {
                    let category_id = match &patch.category {
                        Some(Some(slug)) => Some(Some(resolve_category(conn, slug).await?)),
                        Some(None) => Some(None),
                        None => None,
                    };
                    let genre_ids = match &patch.genres {
                        Some(slugs) => Some(resolve_genres(conn, slugs).await?),
                        None => None,
                    };
                    let changeset = TitleChangeset {
                        name: patch.name.as_ref().map(CatalogueName::as_str),
                        year: patch.year,
                        description: patch.description.as_ref().map(Option::as_deref),
                        category_id,
                    };
                    let row = if changeset.is_empty() {
                        find_row(conn, id.get()).await?
                    } else {
                        diesel::update(titles::table.find(id.get()))
                            .set(&changeset)
                            .returning(TitleRow::as_returning())
                            .get_result(conn)
                            .await
                            .optional()?
                    };
                    let Some(row) = row else {
                        return Ok(None);
                    };
                    if let Some(genre_ids) = &genre_ids {
                        replace_genres(conn, row.id, genre_ids).await?;
                    }
                    Ok(hydrate(conn, vec![row]).await?.pop())
                }
                .scope_boxed()
            })
            .await;
        result.map_err(map_tx_error)
    }

    async fn delete(&self, id: TitleId) -> Result<bool, TitlePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(titles::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
