//! In-process store implementing every repository port.
//!
//! All tables live behind one async mutex, so each repository call is a
//! single critical section. Uniqueness rules and cascades therefore hold
//! under concurrent requests exactly as the PostgreSQL constraints do.
//! Used by the test suites and by `store_backend = "memory"`.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::{
    Attribution, BodyText, CatalogueName, CodeDigest, Comment, CommentId, Rating, Review,
    ReviewId, Score, Taxon, TaxonId, Title, TitleId, User, UserId,
};

mod comments;
mod reviews;
mod taxonomy;
mod titles;
mod users;


/// Shared handle to the in-memory tables. Clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().await
    }
}

#[derive(Debug, Default)]
struct Sequences {
    users: i64,
    taxa: i64,
    titles: i64,
    reviews: i64,
    comments: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    code: Option<CodeDigest>,
}

#[derive(Debug, Clone)]
struct StoredTitle {
    id: TitleId,
    name: CatalogueName,
    year: i32,
    description: Option<String>,
    category: Option<TaxonId>,
    genres: Vec<TaxonId>,
}

#[derive(Debug, Clone)]
struct StoredReview {
    id: ReviewId,
    title_id: TitleId,
    author_id: UserId,
    text: BodyText,
    score: Score,
    pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredComment {
    id: CommentId,
    review_id: ReviewId,
    author_id: UserId,
    text: BodyText,
    pub_date: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    sequences: Sequences,
    users: BTreeMap<UserId, StoredUser>,
    taxa: BTreeMap<TaxonId, Taxon>,
    titles: BTreeMap<TitleId, StoredTitle>,
    reviews: BTreeMap<ReviewId, StoredReview>,
    comments: BTreeMap<CommentId, StoredComment>,
}

impl State {
    fn attribution(&self, author_id: UserId) -> Result<Attribution, String> {
        self.users
            .get(&author_id)
            .map(|stored| Attribution {
                user_id: author_id,
                username: stored.user.username.clone(),
            })
            .ok_or_else(|| format!("author {author_id} is missing"))
    }

    fn hydrate_review(&self, stored: &StoredReview) -> Result<Review, String> {
        Ok(Review {
            id: stored.id,
            title_id: stored.title_id,
            author: self.attribution(stored.author_id)?,
            text: stored.text.clone(),
            score: stored.score,
            pub_date: stored.pub_date,
        })
    }

    fn hydrate_comment(&self, stored: &StoredComment) -> Result<Comment, String> {
        Ok(Comment {
            id: stored.id,
            review_id: stored.review_id,
            author: self.attribution(stored.author_id)?,
            text: stored.text.clone(),
            pub_date: stored.pub_date,
        })
    }

    fn rating(&self, title_id: TitleId) -> Rating {
        Rating::from_scores(
            self.reviews
                .values()
                .filter(|review| review.title_id == title_id)
                .map(|review| review.score),
        )
    }

    fn hydrate_title(&self, stored: &StoredTitle) -> Title {
        Title {
            id: stored.id,
            name: stored.name.clone(),
            year: stored.year,
            description: stored.description.clone(),
            category: stored
                .category
                .and_then(|id| self.taxa.get(&id))
                .cloned(),
            genres: stored
                .genres
                .iter()
                .filter_map(|id| self.taxa.get(id))
                .cloned()
                .collect(),
            rating: self.rating(stored.id),
        }
    }

    fn remove_reviews_where(&mut self, predicate: impl Fn(&StoredReview) -> bool) {
        let doomed: Vec<ReviewId> = self
            .reviews
            .values()
            .filter(|review| predicate(review))
            .map(|review| review.id)
            .collect();
        for id in &doomed {
            self.reviews.remove(id);
        }
        self.comments
            .retain(|_, comment| !doomed.contains(&comment.review_id));
    }
}
