//! Driven port for the write side of reviews.

use async_trait::async_trait;

use crate::domain::ids::ReviewId;
use crate::domain::review::{Review, ReviewUpsert};

/// Errors surfaced by a [`ReviewRepository`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewRepositoryError {
    /// Could not reach the backing store.
    #[error("review store unavailable: {message}")]
    Connection { message: String },

    /// The store rejected or failed the operation.
    #[error("review store error: {message}")]
    Query { message: String },
}

impl ReviewRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Storage port for review mutations.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Insert or refresh the review for `(wine_id, user_id)` as one atomic
    /// store operation backed by the uniqueness constraint.
    ///
    /// After this returns, exactly one review exists for the pair regardless
    /// of how many submissions raced.
    async fn upsert(&self, review: &ReviewUpsert) -> Result<(), ReviewRepositoryError>;

    /// Fetch a review by id.
    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, ReviewRepositoryError>;

    /// Delete a review by id. Deleting an absent id is a no-op.
    async fn delete(&self, id: ReviewId) -> Result<(), ReviewRepositoryError>;
}
