//! Comment threads scoped to a review and that review's title.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::policy::{Action, Actor, Resource, authorize};
use crate::domain::ports::{
    CommentPersistenceError, CommentRepository, CommentThreads, ReviewRepository, ThreadRef,
};
use crate::domain::review_ledger_service::{invalid_text, map_review_error, review_not_found};
use crate::domain::{BodyText, Comment, CommentId, Error, NewComment, Review};

/// Implements [`CommentThreads`] over the review and comment repositories.
#[derive(Clone)]
pub struct CommentThreadService<R, C> {
    reviews: Arc<R>,
    comments: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<R, C> CommentThreadService<R, C> {
    /// Create a new service; `clock` stamps publication dates.
    pub fn new(reviews: Arc<R>, comments: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            reviews,
            comments,
            clock,
        }
    }
}

fn map_comment_error(error: CommentPersistenceError) -> Error {
    match error {
        CommentPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("comment repository unavailable: {message}"))
        }
        CommentPersistenceError::Query { message } => {
            Error::internal(format!("comment repository error: {message}"))
        }
        CommentPersistenceError::ReviewNotFound => Error::not_found("review not found"),
    }
}

fn comment_not_found(id: CommentId) -> Error {
    Error::not_found(format!("comment {id} not found"))
}

impl<R, C> CommentThreadService<R, C>
where
    R: ReviewRepository,
    C: CommentRepository,
{
    async fn thread(&self, thread: ThreadRef) -> Result<Review, Error> {
        self.reviews
            .find(thread.title_id, thread.review_id)
            .await
            .map_err(map_review_error)?
            .ok_or_else(|| review_not_found(thread.review_id))
    }

    async fn load(&self, thread: ThreadRef, comment_id: CommentId) -> Result<Comment, Error> {
        let review = self.thread(thread).await?;
        self.comments
            .find(review.id, comment_id)
            .await
            .map_err(map_comment_error)?
            .ok_or_else(|| comment_not_found(comment_id))
    }
}

#[async_trait]
impl<R, C> CommentThreads for CommentThreadService<R, C>
where
    R: ReviewRepository,
    C: CommentRepository,
{
    async fn list_comments(
        &self,
        _actor: &Actor,
        thread: ThreadRef,
    ) -> Result<Vec<Comment>, Error> {
        let review = self.thread(thread).await?;
        self.comments
            .list_for_review(review.id)
            .await
            .map_err(map_comment_error)
    }

    async fn get_comment(
        &self,
        _actor: &Actor,
        thread: ThreadRef,
        comment_id: CommentId,
    ) -> Result<Comment, Error> {
        self.load(thread, comment_id).await
    }

    async fn create_comment(
        &self,
        actor: &Actor,
        thread: ThreadRef,
        text: String,
    ) -> Result<Comment, Error> {
        authorize(actor, Action::Create, Resource::NewComment)?;
        let principal = actor.require_principal()?;
        let review = self.thread(thread).await?;
        let text = BodyText::new(text).map_err(|error| invalid_text(&error))?;
        let comment = NewComment {
            review_id: review.id,
            author_id: principal.user_id,
            text,
            pub_date: self.clock.utc(),
        };
        let created = self
            .comments
            .create(&comment)
            .await
            .map_err(map_comment_error)?;
        info!(comment_id = %created.id, review_id = %review.id, "comment created");
        Ok(created)
    }

    async fn update_comment(
        &self,
        actor: &Actor,
        thread: ThreadRef,
        comment_id: CommentId,
        text: String,
    ) -> Result<Comment, Error> {
        actor.require_principal()?;
        let comment = self.load(thread, comment_id).await?;
        authorize(
            actor,
            Action::Update,
            Resource::Comment {
                author: comment.author.user_id,
            },
        )?;
        let text = BodyText::new(text).map_err(|error| invalid_text(&error))?;
        self.comments
            .update(comment_id, &text)
            .await
            .map_err(map_comment_error)?
            .ok_or_else(|| comment_not_found(comment_id))
    }

    async fn delete_comment(
        &self,
        actor: &Actor,
        thread: ThreadRef,
        comment_id: CommentId,
    ) -> Result<(), Error> {
        actor.require_principal()?;
        let comment = self.load(thread, comment_id).await?;
        authorize(
            actor,
            Action::Delete,
            Resource::Comment {
                author: comment.author.user_id,
            },
        )?;
        if self
            .comments
            .delete(comment_id)
            .await
            .map_err(map_comment_error)?
        {
            Ok(())
        } else {
            Err(comment_not_found(comment_id))
        }
    }
}
