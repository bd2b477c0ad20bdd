//! Port abstraction for comment persistence.
use async_trait::async_trait;

use crate::domain::{BodyText, Comment, CommentId, NewComment, ReviewId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by comment repository adapters.
    pub enum CommentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "comment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "comment repository query failed: {message}",
        /// The parent review vanished before the insert.
        ReviewNotFound => "review does not exist",
    }
}

/// Comment store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Comments of a review, oldest first.
    async fn list_for_review(
        &self,
        review_id: ReviewId,
    ) -> Result<Vec<Comment>, CommentPersistenceError>;

    /// Fetch a comment, but only when it belongs to `review_id`.
    async fn find(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<Option<Comment>, CommentPersistenceError>;

    /// Insert a comment.
    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentPersistenceError>;

    /// Replace the comment text; `None` when the comment does not exist.
    async fn update(
        &self,
        id: CommentId,
        text: &BodyText,
    ) -> Result<Option<Comment>, CommentPersistenceError>;

    /// Remove a comment.
    async fn delete(&self, id: CommentId) -> Result<bool, CommentPersistenceError>;
}
