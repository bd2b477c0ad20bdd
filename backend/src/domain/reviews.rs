//! Reviews: one scored opinion per author and title.

use std::fmt;

use chrono::{DateTime, Utc};

use super::{TitleId, UserId, Username};

/// Lowest accepted score.
pub const SCORE_MIN: u8 = 1;
/// Highest accepted score.
pub const SCORE_MAX: u8 = 10;

/// Validation errors for review and comment payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewValidationError {
    ScoreOutOfRange { value: i64 },
    EmptyText,
}

impl fmt::Display for ReviewValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScoreOutOfRange { value } => write!(
                f,
                "score must be between {SCORE_MIN} and {SCORE_MAX}, got {value}"
            ),
            Self::EmptyText => write!(f, "text must not be empty"),
        }
    }
}

impl ReviewValidationError {
    /// Stable machine-readable code reported in error details.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ScoreOutOfRange { .. } => "invalid_score",
            Self::EmptyText => "blank",
        }
    }
}

impl std::error::Error for ReviewValidationError {}

/// Integer score in `1..=10`.
///
/// # Examples
/// ```
/// use yamdb::domain::Score;
///
/// assert_eq!(Score::new(10).map(Score::get), Ok(10));
/// assert!(Score::new(0).is_err());
/// assert!(Score::new(11).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u8);

impl Score {
    /// Validate a raw score.
    pub fn new(value: i64) -> Result<Self, ReviewValidationError> {
        u8::try_from(value)
            .ok()
            .filter(|score| (SCORE_MIN..=SCORE_MAX).contains(score))
            .map(Self)
            .ok_or(ReviewValidationError::ScoreOutOfRange { value })
    }

    /// Score value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Free text of a review or comment; never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyText(String);

impl BodyText {
    /// Validate and construct body text. The content is kept verbatim.
    pub fn new(value: impl Into<String>) -> Result<Self, ReviewValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ReviewValidationError::EmptyText);
        }
        Ok(Self(value))
    }

    /// Borrow the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Author of a review or comment, as presented to readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub user_id: UserId,
    pub username: Username,
}

/// Store-assigned review identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReviewId(i64);

impl ReviewId {
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

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: ReviewId,
    pub title_id: TitleId,
    pub author: Attribution,
    pub text: BodyText,
    pub score: Score,
    pub pub_date: DateTime<Utc>,
}

/// Values required to insert a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub title_id: TitleId,
    pub author_id: UserId,
    pub text: BodyText,
    pub score: Score,
    pub pub_date: DateTime<Utc>,
}

/// Partial update of a review. Author, title and date never change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    pub text: Option<BodyText>,
    pub score: Option<Score>,
}

impl ReviewPatch {
    /// Apply the patch to an existing review in place.
    pub fn apply_to(&self, review: &mut Review) {
        if let Some(text) = &self.text {
            review.text = text.clone();
        }
        if let Some(score) = self.score {
            review.score = score;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(5)]
    #[case(10)]
    fn accepts_scores_in_range(#[case] value: i64) {
        let score = Score::new(value).expect("score in range");
        assert_eq!(i64::from(score.get()), value);
    }

    #[rstest]
    #[case(0)]
    #[case(11)]
    #[case(-1)]
    #[case(256 + 5)]
    fn rejects_scores_out_of_range(#[case] value: i64) {
        assert_eq!(
            Score::new(value),
            Err(ReviewValidationError::ScoreOutOfRange { value })
        );
    }

    #[rstest]
    #[case("")]
    #[case(" \n\t")]
    fn rejects_blank_text(#[case] raw: &str) {
        assert_eq!(BodyText::new(raw), Err(ReviewValidationError::EmptyText));
    }

    #[rstest]
    fn keeps_text_verbatim() {
        let text = BodyText::new("  Great film.  ").expect("text");
        assert_eq!(text.as_str(), "  Great film.  ");
    }
}
