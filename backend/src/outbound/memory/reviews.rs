//! [`ReviewRepository`] for the memory store.

use async_trait::async_trait;

use super::{MemoryStore, StoredReview, next};
use crate::domain::ports::{ReviewPersistenceError, ReviewRepository};
use crate::domain::{NewReview, Review, ReviewId, ReviewPatch, TitleId, UserId};

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn list_for_title(
        &self,
        title_id: TitleId,
    ) -> Result<Vec<Review>, ReviewPersistenceError> {
        let state = self.lock().await;
        let mut stored: Vec<&StoredReview> = state
            .reviews
            .values()
            .filter(|review| review.title_id == title_id)
            .collect();
        stored.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        stored
            .into_iter()
            .map(|review| state.hydrate_review(review))
            .collect::<Result<_, _>>()
            .map_err(ReviewPersistenceError::query)
    }

    async fn find(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        let state = self.lock().await;
        state
            .reviews
            .get(&review_id)
            .filter(|review| review.title_id == title_id)
            .map(|review| state.hydrate_review(review))
            .transpose()
            .map_err(ReviewPersistenceError::query)
    }

    async fn find_by_author(
        &self,
        title_id: TitleId,
        author: UserId,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        let state = self.lock().await;
        state
            .reviews
            .values()
            .find(|review| review.title_id == title_id && review.author_id == author)
            .map(|review| state.hydrate_review(review))
            .transpose()
            .map_err(ReviewPersistenceError::query)
    }

    async fn create(&self, review: &NewReview) -> Result<Review, ReviewPersistenceError> {
        let mut state = self.lock().await;
        if !state.titles.contains_key(&review.title_id) {
            return Err(ReviewPersistenceError::title_not_found());
        }
        if state
            .reviews
            .values()
            .any(|r| r.title_id == review.title_id && r.author_id == review.author_id)
        {
            return Err(ReviewPersistenceError::duplicate_review());
        }
        let id = ReviewId::new(next(&mut state.sequences.reviews));
        let stored = StoredReview {
            id,
            title_id: review.title_id,
            author_id: review.author_id,
            text: review.text.clone(),
            score: review.score,
            pub_date: review.pub_date,
        };
        let created = state
            .hydrate_review(&stored)
            .map_err(ReviewPersistenceError::query)?;
        state.reviews.insert(id, stored);
        Ok(created)
    }

    async fn update(
        &self,
        id: ReviewId,
        patch: &ReviewPatch,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        let mut state = self.lock().await;
        let Some(stored) = state.reviews.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(text) = &patch.text {
            stored.text = text.clone();
        }
        if let Some(score) = patch.score {
            stored.score = score;
        }
        let snapshot = stored.clone();
        state
            .hydrate_review(&snapshot)
            .map(Some)
            .map_err(ReviewPersistenceError::query)
    }

    async fn delete(&self, id: ReviewId) -> Result<bool, ReviewPersistenceError> {
        let mut state = self.lock().await;
        let existed = state.reviews.contains_key(&id);
        state.remove_reviews_where(|review| review.id == id);
        Ok(existed)
    }
}
