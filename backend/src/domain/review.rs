//! Review entities and validation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::{DomaineId, ReviewId, UserId, WineId};

/// Inclusive rating bounds.
pub const RATING_MIN: i32 = 1;
/// Inclusive rating bounds.
pub const RATING_MAX: i32 = 5;

/// Validation error for review input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewValidationError {
    /// Rating outside the closed range `[RATING_MIN, RATING_MAX]`, or not an
    /// integer at all at the form boundary.
    RatingOutOfRange,
}

impl fmt::Display for ReviewValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RatingOutOfRange => {
                write!(
                    f,
                    "rating must be an integer between {RATING_MIN} and {RATING_MAX}"
                )
            }
        }
    }
}

impl std::error::Error for ReviewValidationError {}

/// A star rating constrained to `[1, 5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Rating(i32);

impl Rating {
    /// Validate and construct a [`Rating`].
    pub fn new(raw: i32) -> Result<Self, ReviewValidationError> {
        if !(RATING_MIN..=RATING_MAX).contains(&raw) {
            return Err(ReviewValidationError::RatingOutOfRange);
        }
        Ok(Self(raw))
    }

    /// Raw integer value.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trim a submitted comment; a blank comment is "no comment", never an empty
/// string in storage.
pub fn normalize_comment(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// A stored review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub wine_id: WineId,
    pub user_id: UserId,
    pub rating: Rating,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for the constraint-backed review upsert.
///
/// Persisting this either inserts a new review or refreshes the existing one
/// for `(wine_id, user_id)` in a single atomic store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewUpsert {
    pub wine_id: WineId,
    pub user_id: UserId,
    pub rating: Rating,
    pub comment: Option<String>,
}

/// A review annotated with the reviewer's username, for the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WineReview {
    pub id: ReviewId,
    pub rating: Rating,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: UserId,
    pub username: String,
}

/// A review annotated with its wine and domaine, for the "my reviews" page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserReview {
    pub id: ReviewId,
    pub rating: Rating,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub wine_id: WineId,
    pub wine_name: String,
    pub year: Option<i32>,
    pub domaine_id: DomaineId,
    pub domaine_name: String,
}

/// Derived aggregate for a single wine, always computed from live rows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WineStats {
    pub count: i64,
    /// `None` when the wine has no reviews; otherwise rounded to 2 decimals.
    pub avg: Option<f64>,
}
