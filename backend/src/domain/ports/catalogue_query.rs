//! Driving port for read-side catalogue aggregation.

use async_trait::async_trait;

use crate::domain::catalogue::{Domaine, WineDetail, WineFilter, WineSummary};
use crate::domain::ids::{UserId, WineId};
use crate::domain::review::{Review, UserReview, WineReview, WineStats};

/// Errors surfaced by a [`CatalogueQuery`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueQueryError {
    /// Could not reach the backing store.
    #[error("catalogue store unavailable: {message}")]
    Connection { message: String },

    /// The store rejected or failed the query.
    #[error("catalogue store error: {message}")]
    Query { message: String },
}

impl CatalogueQueryError {
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

impl From<CatalogueQueryError> for crate::domain::Error {
    fn from(error: CatalogueQueryError) -> Self {
        match error {
            CatalogueQueryError::Connection { .. } => Self::service_unavailable(error.to_string()),
            CatalogueQueryError::Query { .. } => Self::internal(error.to_string()),
        }
    }
}

/// Read-only catalogue aggregation.
///
/// All aggregates are computed from live rows at query time; nothing here
/// mutates state.
#[async_trait]
pub trait CatalogueQuery: Send + Sync {
    /// Domaines ordered by name, for the search filter and wine forms.
    async fn list_domaines_by_name(&self) -> Result<Vec<Domaine>, CatalogueQueryError>;

    /// Domaines ordered by creation time descending, for the admin listing.
    async fn list_domaines_newest(&self) -> Result<Vec<Domaine>, CatalogueQueryError>;

    /// Wine listing with per-wine review aggregates, filtered and ordered by
    /// wine creation time descending.
    async fn list_wines(
        &self,
        filter: &WineFilter,
    ) -> Result<Vec<WineSummary>, CatalogueQueryError>;

    /// A single wine joined with its domaine, `None` when absent.
    async fn wine_detail(&self, id: WineId) -> Result<Option<WineDetail>, CatalogueQueryError>;

    /// Review count and rounded average rating for one wine.
    async fn wine_stats(&self, id: WineId) -> Result<WineStats, CatalogueQueryError>;

    /// All reviews of one wine, newest first, annotated with usernames.
    async fn reviews_for_wine(&self, id: WineId)
    -> Result<Vec<WineReview>, CatalogueQueryError>;

    /// The signed-in user's own review of a wine, for form pre-fill.
    async fn review_for_user(
        &self,
        wine_id: WineId,
        user_id: UserId,
    ) -> Result<Option<Review>, CatalogueQueryError>;

    /// All reviews written by one user, newest first, annotated with wine and
    /// domaine names.
    async fn reviews_by_user(&self, user_id: UserId)
    -> Result<Vec<UserReview>, CatalogueQueryError>;
}
