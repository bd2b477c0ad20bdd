//! Comments attached to reviews.

use std::fmt;

use chrono::{DateTime, Utc};

use super::{Attribution, BodyText, ReviewId, UserId};

/// Store-assigned comment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommentId(i64);

impl CommentId {
    /// Wrap a raw store identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub review_id: ReviewId,
    pub author: Attribution,
    pub text: BodyText,
    pub pub_date: DateTime<Utc>,
}

/// Values required to insert a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub review_id: ReviewId,
    pub author_id: UserId,
    pub text: BodyText,
    pub pub_date: DateTime<Utc>,
}
