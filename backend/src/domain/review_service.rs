//! Review reconciliation: the one-review-per-user-per-wine invariant.

use std::sync::Arc;

use tracing::debug;

use super::error::Error;
use super::ids::{ReviewId, WineId};
use super::ports::{ReviewRepository, ReviewRepositoryError};
use super::review::{Rating, ReviewUpsert, ReviewValidationError, normalize_comment};
use super::user::CurrentUser;

/// Review service implementing submit/delete with ownership rules.
#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
}

impl ReviewService {
    /// Create a new service over a review store.
    pub fn new(reviews: Arc<dyn ReviewRepository>) -> Self {
        Self { reviews }
    }

    /// Submit a rating+comment for a wine on behalf of `user`.
    ///
    /// Validation happens before any store access; a second submission by the
    /// same user updates the existing review in place via the store's
    /// constraint-backed upsert rather than failing or duplicating.
    pub async fn submit(
        &self,
        wine_id: WineId,
        user: &CurrentUser,
        rating: i32,
        comment: &str,
    ) -> Result<(), Error> {
        let rating = Rating::new(rating).map_err(map_validation_error)?;
        let upsert = ReviewUpsert {
            wine_id,
            user_id: user.id,
            rating,
            comment: normalize_comment(comment),
        };
        self.reviews
            .upsert(&upsert)
            .await
            .map_err(map_review_error)?;
        debug!(wine_id = %wine_id, user_id = %user.id, rating = %rating, "review stored");
        Ok(())
    }

    /// Delete a review on behalf of `acting_user`.
    ///
    /// Only the owner or an admin may delete. Returns the wine the review
    /// belonged to so the caller can redirect back to its page. A repeat
    /// delete of the same id yields `NotFound`, which callers treat as a
    /// benign terminal state.
    pub async fn delete(
        &self,
        review_id: ReviewId,
        acting_user: &CurrentUser,
    ) -> Result<WineId, Error> {
        let review = self
            .reviews
            .find_by_id(review_id)
            .await
            .map_err(map_review_error)?
            .ok_or_else(|| Error::not_found("review not found"))?;

        if review.user_id != acting_user.id && !acting_user.is_admin() {
            return Err(Error::forbidden("you may only delete your own reviews"));
        }

        self.reviews
            .delete(review_id)
            .await
            .map_err(map_review_error)?;
        debug!(review_id = %review_id, user_id = %acting_user.id, "review deleted");
        Ok(review.wine_id)
    }
}

fn map_validation_error(error: ReviewValidationError) -> Error {
    Error::invalid_request(error.to_string())
}

fn map_review_error(error: ReviewRepositoryError) -> Error {
    match error {
        ReviewRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("review store unavailable: {message}"))
        }
        ReviewRepositoryError::Query { message } => {
            Error::internal(format!("review store error: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ids::UserId;
    use crate::domain::review::Review;
    use crate::domain::user::Role;

    #[derive(Default)]
    struct StubReviewRepository {
        reviews: Mutex<Vec<Review>>,
        next_id: AtomicUsize,
        upsert_calls: AtomicUsize,
    }

    impl StubReviewRepository {
        fn stored(&self) -> Vec<Review> {
            self.reviews.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl ReviewRepository for StubReviewRepository {
        async fn upsert(&self, review: &ReviewUpsert) -> Result<(), ReviewRepositoryError> {
            self.upsert_calls.fetch_add(1, Ordering::Relaxed);
            let mut reviews = self.reviews.lock().expect("lock");
            if let Some(existing) = reviews
                .iter_mut()
                .find(|r| r.wine_id == review.wine_id && r.user_id == review.user_id)
            {
                existing.rating = review.rating;
                existing.comment = review.comment.clone();
                existing.created_at = Utc::now();
            } else {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed) as i32 + 1;
                reviews.push(Review {
                    id: ReviewId::new(id),
                    wine_id: review.wine_id,
                    user_id: review.user_id,
                    rating: review.rating,
                    comment: review.comment.clone(),
                    created_at: Utc::now(),
                });
            }
            Ok(())
        }

        async fn find_by_id(
            &self,
            id: ReviewId,
        ) -> Result<Option<Review>, ReviewRepositoryError> {
            Ok(self
                .reviews
                .lock()
                .expect("lock")
                .iter()
                .find(|r| r.id == id)
                .cloned())
        }

        async fn delete(&self, id: ReviewId) -> Result<(), ReviewRepositoryError> {
            self.reviews.lock().expect("lock").retain(|r| r.id != id);
            Ok(())
        }
    }

    fn user(id: i32, role: Role) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            username: format!("user{id}"),
            role,
        }
    }

    #[tokio::test]
    async fn double_submission_keeps_one_review_with_latest_values() {
        let repo = Arc::new(StubReviewRepository::default());
        let svc = ReviewService::new(repo.clone());
        let alice = user(1, Role::User);
        let wine = WineId::new(7);

        svc.submit(wine, &alice, 4, "nice").await.expect("first");
        svc.submit(wine, &alice, 2, "").await.expect("second");

        let stored = repo.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].rating.get(), 2);
        assert_eq!(stored[0].comment, None);
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[tokio::test]
    async fn invalid_ratings_never_reach_the_store(#[case] rating: i32) {
        let repo = Arc::new(StubReviewRepository::default());
        let svc = ReviewService::new(repo.clone());

        let err = svc
            .submit(WineId::new(1), &user(1, Role::User), rating, "ignored")
            .await
            .expect_err("must fail");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(repo.upsert_calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn strangers_cannot_delete_but_owner_and_admin_can() {
        let repo = Arc::new(StubReviewRepository::default());
        let svc = ReviewService::new(repo.clone());
        let owner = user(1, Role::User);
        let stranger = user(2, Role::User);
        let admin = user(3, Role::Admin);
        let wine = WineId::new(1);

        svc.submit(wine, &owner, 5, "superb").await.expect("submit");
        let review_id = repo.stored()[0].id;

        let err = svc
            .delete(review_id, &stranger)
            .await
            .expect_err("stranger must be refused");
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let wine_id = svc.delete(review_id, &owner).await.expect("owner deletes");
        assert_eq!(wine_id, wine);

        // Second delete of the same id is a benign NotFound, not a crash.
        let err = svc
            .delete(review_id, &admin)
            .await
            .expect_err("already gone");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn admin_can_delete_someone_elses_review() {
        let repo = Arc::new(StubReviewRepository::default());
        let svc = ReviewService::new(repo.clone());
        let owner = user(1, Role::User);
        let admin = user(3, Role::Admin);

        svc.submit(WineId::new(1), &owner, 3, "fine").await.expect("submit");
        let review_id = repo.stored()[0].id;

        svc.delete(review_id, &admin).await.expect("admin deletes");
        assert!(repo.stored().is_empty());
    }
}
