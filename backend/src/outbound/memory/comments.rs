//! [`CommentRepository`] for the memory store.

use async_trait::async_trait;

use super::{MemoryStore, StoredComment, next};
use crate::domain::ports::{CommentPersistenceError, CommentRepository};
use crate::domain::{BodyText, Comment, CommentId, NewComment, ReviewId};

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn list_for_review(
        &self,
        review_id: ReviewId,
    ) -> Result<Vec<Comment>, CommentPersistenceError> {
        let state = self.lock().await;
        let mut stored: Vec<&StoredComment> = state
            .comments
            .values()
            .filter(|comment| comment.review_id == review_id)
            .collect();
        stored.sort_by(|a, b| a.pub_date.cmp(&b.pub_date).then(a.id.cmp(&b.id)));
        stored
            .into_iter()
            .map(|comment| state.hydrate_comment(comment))
            .collect::<Result<_, _>>()
            .map_err(CommentPersistenceError::query)
    }

    async fn find(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<Option<Comment>, CommentPersistenceError> {
        let state = self.lock().await;
        state
            .comments
            .get(&comment_id)
            .filter(|comment| comment.review_id == review_id)
            .map(|comment| state.hydrate_comment(comment))
            .transpose()
            .map_err(CommentPersistenceError::query)
    }

    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentPersistenceError> {
        let mut state = self.lock().await;
        if !state.reviews.contains_key(&comment.review_id) {
            return Err(CommentPersistenceError::review_not_found());
        }
        let id = CommentId::new(next(&mut state.sequences.comments));
        let stored = StoredComment {
            id,
            review_id: comment.review_id,
            author_id: comment.author_id,
            text: comment.text.clone(),
            pub_date: comment.pub_date,
        };
        let created = state
            .hydrate_comment(&stored)
            .map_err(CommentPersistenceError::query)?;
        state.comments.insert(id, stored);
        Ok(created)
    }

    async fn update(
        &self,
        id: CommentId,
        text: &BodyText,
    ) -> Result<Option<Comment>, CommentPersistenceError> {
        let mut state = self.lock().await;
        let Some(stored) = state.comments.get_mut(&id) else {
            return Ok(None);
        };
        stored.text = text.clone();
        let snapshot = stored.clone();
        state
            .hydrate_comment(&snapshot)
            .map(Some)
            .map_err(CommentPersistenceError::query)
    }

    async fn delete(&self, id: CommentId) -> Result<bool, CommentPersistenceError> {
        let mut state = self.lock().await;
        Ok(state.comments.remove(&id).is_some())
    }
}
