//! Derived title rating.

use serde::Serialize;

use crate::domain::Score;

/// Arithmetic mean of a title's review scores; absent when unreviewed.
///
/// # Examples
/// ```
/// use yamdb::domain::{Rating, Score};
///
/// let scores = [7, 8, 10].map(|value| Score::new(value).expect("in range"));
/// assert_eq!(Rating::from_scores(scores).value(), Some(25.0 / 3.0));
/// assert_eq!(Rating::from_scores([]).value(), None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Rating(Option<f64>);

impl Rating {
    /// Rating of a title without reviews.
    pub const UNRATED: Self = Self(None);

    /// Compute the mean of the given scores.
    pub fn from_scores(scores: impl IntoIterator<Item = Score>) -> Self {
        let (sum, count) = scores
            .into_iter()
            .fold((0_u32, 0_u32), |(sum, count), score| {
                (sum + u32::from(score.get()), count + 1)
            });
        if count == 0 {
            Self::UNRATED
        } else {
            Self(Some(f64::from(sum) / f64::from(count)))
        }
    }

    /// The mean, or `None` when there are no reviews.
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        self.0
    }
}
