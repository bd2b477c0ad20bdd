//! Driving port for comment threads.

use async_trait::async_trait;

use crate::domain::policy::Actor;
use crate::domain::{Comment, CommentId, Error, ReviewId, TitleId};

/// A review addressed through its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadRef {
    pub title_id: TitleId,
    pub review_id: ReviewId,
}

/// Domain use-case port for comments on reviews.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentThreads: Send + Sync {
    /// Comments of a review, oldest first.
    async fn list_comments(&self, actor: &Actor, thread: ThreadRef)
    -> Result<Vec<Comment>, Error>;

    /// Fetch one comment.
    async fn get_comment(
        &self,
        actor: &Actor,
        thread: ThreadRef,
        comment_id: CommentId,
    ) -> Result<Comment, Error>;

    /// Comment on a review as the caller.
    async fn create_comment(
        &self,
        actor: &Actor,
        thread: ThreadRef,
        text: String,
    ) -> Result<Comment, Error>;

    /// Replace the text of a comment.
    async fn update_comment(
        &self,
        actor: &Actor,
        thread: ThreadRef,
        comment_id: CommentId,
        text: String,
    ) -> Result<Comment, Error>;

    /// Delete a comment.
    async fn delete_comment(
        &self,
        actor: &Actor,
        thread: ThreadRef,
        comment_id: CommentId,
    ) -> Result<(), Error>;
}
