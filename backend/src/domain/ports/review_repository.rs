//! Port abstraction for the review ledger store.
use async_trait::async_trait;

use crate::domain::{NewReview, Review, ReviewId, ReviewPatch, TitleId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by review repository adapters.
    pub enum ReviewPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "review repository query failed: {message}",
        /// The (author, title) pair already has a review.
        DuplicateReview => "the author has already reviewed this title",
        /// The parent title vanished before the insert.
        TitleNotFound => "title does not exist",
    }
}

/// Review store. The unique (author, title) constraint lives here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Reviews of a title, newest first.
    async fn list_for_title(&self, title_id: TitleId)
    -> Result<Vec<Review>, ReviewPersistenceError>;

    /// Fetch a review, but only when it belongs to `title_id`.
    async fn find(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<Option<Review>, ReviewPersistenceError>;

    /// The review `author` wrote for `title_id`, if any.
    async fn find_by_author(
        &self,
        title_id: TitleId,
        author: UserId,
    ) -> Result<Option<Review>, ReviewPersistenceError>;

    /// Insert a review.
    async fn create(&self, review: &NewReview) -> Result<Review, ReviewPersistenceError>;

    /// Apply a partial update; `None` when the review does not exist.
    async fn update(
        &self,
        id: ReviewId,
        patch: &ReviewPatch,
    ) -> Result<Option<Review>, ReviewPersistenceError>;

    /// Remove a review together with its comments.
    async fn delete(&self, id: ReviewId) -> Result<bool, ReviewPersistenceError>;
}
