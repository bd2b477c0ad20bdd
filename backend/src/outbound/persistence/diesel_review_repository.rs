//! PostgreSQL-backed [`ReviewRepository`] implementation using Diesel ORM.
//!
//! One review per author and title is enforced by `reviews_author_title_key`;
//! a concurrent second insert surfaces as [`ReviewPersistenceError::DuplicateReview`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{ReviewPersistenceError, ReviewRepository};
use crate::domain::{BodyText, NewReview, Review, ReviewId, ReviewPatch, TitleId, UserId};

use super::diesel_error_mapping::{DbFailure, classify, pool_message};
use super::models::{NewReviewRow, ReviewChangeset, ReviewRow};
use super::pool::{DbPool, PoolError};
use super::schema::{reviews, users};

/// Diesel-backed review store.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReviewPersistenceError {
    ReviewPersistenceError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> ReviewPersistenceError {
    match classify(error) {
        DbFailure::UniqueViolation(violation) if violation.is("reviews_author_title_key") => {
            ReviewPersistenceError::duplicate_review()
        }
        DbFailure::ForeignKeyViolation(violation) if violation.is("reviews_title_id_fkey") => {
            ReviewPersistenceError::title_not_found()
        }
        DbFailure::Connection(message) => ReviewPersistenceError::connection(message),
        DbFailure::UniqueViolation(_) | DbFailure::ForeignKeyViolation(_) => {
            ReviewPersistenceError::query("constraint violation")
        }
        DbFailure::Query(message) => ReviewPersistenceError::query(message),
    }
}

fn to_domain((row, username): (ReviewRow, String)) -> Result<Review, ReviewPersistenceError> {
    row.into_review(username)
        .map_err(ReviewPersistenceError::query)
}

async fn load_one(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> Result<Option<(ReviewRow, String)>, diesel::result::Error> {
    reviews::table
        .inner_join(users::table)
        .filter(reviews::id.eq(id))
        .select((ReviewRow::as_select(), users::username))
        .first(conn)
        .await
        .optional()
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn list_for_title(
        &self,
        title_id: TitleId,
    ) -> Result<Vec<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(ReviewRow, String)> = reviews::table
            .inner_join(users::table)
            .filter(reviews::title_id.eq(title_id.get()))
            .select((ReviewRow::as_select(), users::username))
            .order_by((reviews::pub_date.desc(), reviews::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_domain).collect()
    }

    async fn find(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(ReviewRow, String)> = reviews::table
            .inner_join(users::table)
            .filter(reviews::id.eq(review_id.get()))
            .filter(reviews::title_id.eq(title_id.get()))
            .select((ReviewRow::as_select(), users::username))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_domain).transpose()
    }

    async fn find_by_author(
        &self,
        title_id: TitleId,
        author: UserId,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(ReviewRow, String)> = reviews::table
            .inner_join(users::table)
            .filter(reviews::title_id.eq(title_id.get()))
            .filter(reviews::author_id.eq(author.get()))
            .select((ReviewRow::as_select(), users::username))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_domain).transpose()
    }

    async fn create(&self, review: &NewReview) -> Result<Review, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewReviewRow {
            title_id: review.title_id.get(),
            author_id: review.author_id.get(),
            text: review.text.as_str(),
            score: i16::from(review.score.get()),
            pub_date: review.pub_date,
        };
        let loaded = conn
            .transaction(|conn| {
                async move {
                    let id: i64 = diesel::insert_into(reviews::table)
                        .values(&new_row)
                        .returning(reviews::id)
                        .get_result(conn)
                        .await?;
                    debug!(review_id = id, "inserted review");
                    load_one(conn, id).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        loaded
            .map(to_domain)
            .transpose()?
            .ok_or_else(|| ReviewPersistenceError::query("inserted review could not be read back"))
    }

    async fn update(
        &self,
        id: ReviewId,
        patch: &ReviewPatch,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = ReviewChangeset {
            text: patch.text.as_ref().map(BodyText::as_str),
            score: patch.score.map(|score| i16::from(score.get())),
        };
        let loaded = conn
            .transaction(|conn| {
                async move {
                    if changeset.text.is_some() || changeset.score.is_some() {
                        diesel::update(reviews::table.find(id.get()))
                            .set(&changeset)
                            .execute(conn)
                            .await?;
                    }
                    load_one(conn, id.get()).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        loaded.map(to_domain).transpose()
    }

    async fn delete(&self, id: ReviewId) -> Result<bool, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(reviews::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::persistence::diesel_error_mapping::test_support::violation;
    use diesel::result::DatabaseErrorKind;
    use rstest::rstest;

    #[rstest]
    #[case(
        DatabaseErrorKind::UniqueViolation,
        "reviews_author_title_key",
        ReviewPersistenceError::duplicate_review()
    )]
    #[case(
        DatabaseErrorKind::ForeignKeyViolation,
        "reviews_title_id_fkey",
        ReviewPersistenceError::title_not_found()
    )]
    #[case(
        DatabaseErrorKind::ForeignKeyViolation,
        "reviews_author_id_fkey",
        ReviewPersistenceError::query("constraint violation")
    )]
    fn constraint_violations_map_to_port_errors(
        #[case] kind: DatabaseErrorKind,
        #[case] constraint: &'static str,
        #[case] expected: ReviewPersistenceError,
    ) {
        assert_eq!(map_diesel_error(violation(kind, constraint)), expected);
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let error = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(error, ReviewPersistenceError::Connection { .. }));
    }
}
