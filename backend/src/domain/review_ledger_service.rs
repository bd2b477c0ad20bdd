//! Review ledger: one review per author and title, scores in `1..=10`.
//!
//! The service checks title existence and prior reviews before validating
//! the payload, so callers see `NotFound` and `Conflict` ahead of field
//! errors. The store's unique (author, title) constraint remains the final
//! guard against concurrent duplicate inserts.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::catalogue_service::{map_title_error, title_not_found};
use crate::domain::policy::{Action, Actor, Resource, authorize};
use crate::domain::ports::{
    ReviewChanges, ReviewDraft, ReviewLedger, ReviewPersistenceError, ReviewRepository,
    TitleRepository,
};
use crate::domain::{
    BodyText, Error, NewReview, Review, ReviewId, ReviewPatch, ReviewValidationError, Score,
    TitleId,
};

/// Implements [`ReviewLedger`] over the title and review repositories.
#[derive(Clone)]
pub struct ReviewLedgerService<T, R> {
    titles: Arc<T>,
    reviews: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<T, R> ReviewLedgerService<T, R> {
    /// Create a new service; `clock` stamps publication dates.
    pub fn new(titles: Arc<T>, reviews: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            titles,
            reviews,
            clock,
        }
    }
}

pub(crate) fn map_review_error(error: ReviewPersistenceError) -> Error {
    match error {
        ReviewPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("review repository unavailable: {message}"))
        }
        ReviewPersistenceError::Query { message } => {
            Error::internal(format!("review repository error: {message}"))
        }
        ReviewPersistenceError::DuplicateReview => duplicate_review(),
        ReviewPersistenceError::TitleNotFound => Error::not_found("title not found"),
    }
}

fn duplicate_review() -> Error {
    Error::field_conflict(
        "title",
        "duplicate_review",
        "you have already reviewed this title",
    )
}

pub(crate) fn review_not_found(id: ReviewId) -> Error {
    Error::not_found(format!("review {id} not found"))
}

pub(crate) fn invalid_text(error: &ReviewValidationError) -> Error {
    Error::invalid_field("text", error.code(), error.to_string())
}

fn validate_score(raw: i64) -> Result<Score, Error> {
    Score::new(raw).map_err(|error| Error::invalid_field("score", error.code(), error.to_string()))
}

fn validate_changes(changes: ReviewChanges) -> Result<ReviewPatch, Error> {
    let text = changes
        .text
        .map(BodyText::new)
        .transpose()
        .map_err(|error| invalid_text(&error))?;
    let score = changes.score.map(validate_score).transpose()?;
    Ok(ReviewPatch { text, score })
}

impl<T, R> ReviewLedgerService<T, R>
where
    T: TitleRepository,
    R: ReviewRepository,
{
    async fn ensure_title(&self, title_id: TitleId) -> Result<(), Error> {
        self.titles
            .find_by_id(title_id)
            .await
            .map_err(map_title_error)?
            .map(|_| ())
            .ok_or_else(|| title_not_found(title_id))
    }

    async fn load(&self, title_id: TitleId, review_id: ReviewId) -> Result<Review, Error> {
        self.reviews
            .find(title_id, review_id)
            .await
            .map_err(map_review_error)?
            .ok_or_else(|| review_not_found(review_id))
    }
}

#[async_trait]
impl<T, R> ReviewLedger for ReviewLedgerService<T, R>
where
    T: TitleRepository,
    R: ReviewRepository,
{
    async fn list_reviews(&self, _actor: &Actor, title_id: TitleId) -> Result<Vec<Review>, Error> {
        self.ensure_title(title_id).await?;
        self.reviews
            .list_for_title(title_id)
            .await
            .map_err(map_review_error)
    }

    async fn get_review(
        &self,
        _actor: &Actor,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<Review, Error> {
        self.load(title_id, review_id).await
    }

    async fn create_review(
        &self,
        actor: &Actor,
        title_id: TitleId,
        draft: ReviewDraft,
    ) -> Result<Review, Error> {
        authorize(actor, Action::Create, Resource::NewReview)?;
        let principal = actor.require_principal()?;
        self.ensure_title(title_id).await?;

        let existing = self
            .reviews
            .find_by_author(title_id, principal.user_id)
            .await
            .map_err(map_review_error)?;
        if existing.is_some() {
            return Err(duplicate_review());
        }

        let score = validate_score(draft.score)?;
        let text = BodyText::new(draft.text).map_err(|error| invalid_text(&error))?;
        let review = NewReview {
            title_id,
            author_id: principal.user_id,
            text,
            score,
            pub_date: self.clock.utc(),
        };
        let created = self
            .reviews
            .create(&review)
            .await
            .map_err(map_review_error)?;
        info!(review_id = %created.id, title_id = %title_id, "review created");
        Ok(created)
    }

    async fn update_review(
        &self,
        actor: &Actor,
        title_id: TitleId,
        review_id: ReviewId,
        changes: ReviewChanges,
    ) -> Result<Review, Error> {
        actor.require_principal()?;
        let review = self.load(title_id, review_id).await?;
        authorize(
            actor,
            Action::Update,
            Resource::Review {
                author: review.author.user_id,
            },
        )?;
        let patch = validate_changes(changes)?;
        self.reviews
            .update(review_id, &patch)
            .await
            .map_err(map_review_error)?
            .ok_or_else(|| review_not_found(review_id))
    }

    async fn delete_review(
        &self,
        actor: &Actor,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<(), Error> {
        actor.require_principal()?;
        let review = self.load(title_id, review_id).await?;
        authorize(
            actor,
            Action::Delete,
            Resource::Review {
                author: review.author.user_id,
            },
        )?;
        if self
            .reviews
            .delete(review_id)
            .await
            .map_err(map_review_error)?
        {
            info!(review_id = %review_id, "review deleted");
            Ok(())
        } else {
            Err(review_not_found(review_id))
        }
    }
}

#[cfg(test)]
#[path = "review_ledger_service_tests.rs"]
mod tests;
