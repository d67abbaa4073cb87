//! PostgreSQL-backed `ReviewRepository` using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ReviewRepository, ReviewRepositoryError};
use crate::domain::{Review, ReviewId, ReviewUpsert};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewReviewRow, ReviewRow};
use super::pool::DbPool;
use super::schema::reviews;

/// Diesel-backed implementation of the `ReviewRepository` port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> ReviewRepositoryError {
    map_diesel_error(
        error,
        ReviewRepositoryError::query,
        ReviewRepositoryError::connection,
    )
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn upsert(&self, review: &ReviewUpsert) -> Result<(), ReviewRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, ReviewRepositoryError::connection))?;

        let row = NewReviewRow {
            wine_id: review.wine_id.get(),
            user_id: review.user_id.get(),
            rating: review.rating.get(),
            comment: review.comment.as_deref(),
        };

        // One atomic statement: the (wine_id, user_id) constraint resolves
        // concurrent submissions without a read-modify-write window.
        diesel::insert_into(reviews::table)
            .values(&row)
            .on_conflict((reviews::wine_id, reviews::user_id))
            .do_update()
            .set((
                reviews::rating.eq(excluded(reviews::rating)),
                reviews::comment.eq(excluded(reviews::comment)),
                reviews::created_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, ReviewRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, ReviewRepositoryError::connection))?;

        let row: Option<ReviewRow> = reviews::table
            .find(id.get())
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        row.map(|r| {
            r.into_domain()
                .map_err(|err| ReviewRepositoryError::query(format!("invalid stored review: {err}")))
        })
        .transpose()
    }

    async fn delete(&self, id: ReviewId) -> Result<(), ReviewRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, ReviewRepositoryError::connection))?;

        diesel::delete(reviews::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(())
    }
}
