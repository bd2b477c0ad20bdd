//! PostgreSQL-backed [`CommentRepository`] implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{CommentPersistenceError, CommentRepository};
use crate::domain::{BodyText, Comment, CommentId, NewComment, ReviewId};

use super::diesel_error_mapping::{DbFailure, classify, pool_message};
use super::models::{CommentRow, NewCommentRow};
use super::pool::{DbPool, PoolError};
use super::schema::{comments, users};

/// Diesel-backed comment store.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CommentPersistenceError {
    CommentPersistenceError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> CommentPersistenceError {
    match classify(error) {
        DbFailure::ForeignKeyViolation(violation) if violation.is("comments_review_id_fkey") => {
            CommentPersistenceError::review_not_found()
        }
        DbFailure::Connection(message) => CommentPersistenceError::connection(message),
        DbFailure::UniqueViolation(_) | DbFailure::ForeignKeyViolation(_) => {
            CommentPersistenceError::query("constraint violation")
        }
        DbFailure::Query(message) => CommentPersistenceError::query(message),
    }
}

fn to_domain((row, username): (CommentRow, String)) -> Result<Comment, CommentPersistenceError> {
    row.into_comment(username)
        .map_err(CommentPersistenceError::query)
}

async fn load_one(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> Result<Option<(CommentRow, String)>, diesel::result::Error> {
    comments::table
        .inner_join(users::table)
        .filter(comments::id.eq(id))
        .select((CommentRow::as_select(), users::username))
        .first(conn)
        .await
        .optional()
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn list_for_review(
        &self,
        review_id: ReviewId,
    ) -> Result<Vec<Comment>, CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(CommentRow, String)> = comments::table
            .inner_join(users::table)
            .filter(comments::review_id.eq(review_id.get()))
            .select((CommentRow::as_select(), users::username))
            .order_by((comments::pub_date.asc(), comments::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_domain).collect()
    }

    async fn find(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<Option<Comment>, CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(CommentRow, String)> = comments::table
            .inner_join(users::table)
            .filter(comments::id.eq(comment_id.get()))
            .filter(comments::review_id.eq(review_id.get()))
            .select((CommentRow::as_select(), users::username))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_domain).transpose()
    }

    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewCommentRow {
            review_id: comment.review_id.get(),
            author_id: comment.author_id.get(),
            text: comment.text.as_str(),
            pub_date: comment.pub_date,
        };
        let loaded = conn
            .transaction(|conn| {
                async move {
                    let id: i64 = diesel::insert_into(comments::table)
                        .values(&new_row)
                        .returning(comments::id)
                        .get_result(conn)
                        .await?;
                    load_one(conn, id).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        loaded
            .map(to_domain)
            .transpose()?
            .ok_or_else(|| CommentPersistenceError::query("inserted comment could not be read back"))
    }

    async fn update(
        &self,
        id: CommentId,
        text: &BodyText,
    ) -> Result<Option<Comment>, CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let loaded = conn
            .transaction(|conn| {
                async move {
                    diesel::update(comments::table.find(id.get()))
                        .set(comments::text.eq(text.as_str()))
                        .execute(conn)
                        .await?;
                    load_one(conn, id.get()).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        loaded.map(to_domain).transpose()
    }

    async fn delete(&self, id: CommentId) -> Result<bool, CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(comments::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
