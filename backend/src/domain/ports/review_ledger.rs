//! Driving port for reviews.
//!
//! Drafts carry raw client values; the ledger validates them after checking
//! that the title exists and that the caller has not reviewed it yet.

use async_trait::async_trait;

use crate::domain::policy::Actor;
use crate::domain::{Error, Review, ReviewId, TitleId};

/// Unvalidated fields of a new review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub text: String,
    pub score: i64,
}

/// Unvalidated partial update of a review.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewChanges {
    pub text: Option<String>,
    pub score: Option<i64>,
}

/// Domain use-case port for the review ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewLedger: Send + Sync {
    /// Reviews of a title, newest first.
    async fn list_reviews(&self, actor: &Actor, title_id: TitleId) -> Result<Vec<Review>, Error>;

    /// Fetch one review of a title.
    async fn get_review(
        &self,
        actor: &Actor,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<Review, Error>;

    /// Review a title as the caller.
    async fn create_review(
        &self,
        actor: &Actor,
        title_id: TitleId,
        draft: ReviewDraft,
    ) -> Result<Review, Error>;

    /// Change the text or score of a review.
    async fn update_review(
        &self,
        actor: &Actor,
        title_id: TitleId,
        review_id: ReviewId,
        changes: ReviewChanges,
    ) -> Result<Review, Error>;

    /// Delete a review and its comments.
    async fn delete_review(
        &self,
        actor: &Actor,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<(), Error>;
}
