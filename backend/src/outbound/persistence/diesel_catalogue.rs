//! PostgreSQL-backed catalogue query/command adapter using Diesel.
//!
//! The listing and stats aggregations use raw SQL through `sql_query`: the
//! grouped `COUNT`/`AVG` over a left join with optional filters reads better
//! as one statement than as a boxed DSL query, and the binds keep it
//! parameterised.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Integer, Nullable, Text};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    CatalogueCommand, CatalogueCommandError, CatalogueQuery, CatalogueQueryError,
};
use crate::domain::{
    Domaine, DomaineDraft, DomaineId, Rating, Review, ReviewId, UserId, UserReview, Wine,
    WineDetail, WineDraft, WineFilter, WineId, WineReview, WineStats, WineSummary,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    DomaineRow, DomaineUpdate, NewDomaineRow, NewWineRow, ReviewRow, WineRow, WineUpdate,
};
use super::pool::DbPool;
use super::schema::{domains, reviews, users, wines};

/// Diesel-backed implementation of the catalogue ports.
#[derive(Clone)]
pub struct DieselCatalogue {
    pool: DbPool,
}

impl DieselCatalogue {
    /// Create a new adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(
        &self,
    ) -> Result<
        diesel_async::pooled_connection::bb8::PooledConnection<
            '_,
            diesel_async::AsyncPgConnection,
        >,
        CatalogueQueryError,
    > {
        self.pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, CatalogueQueryError::connection))
    }
}

fn map_error(error: diesel::result::Error) -> CatalogueQueryError {
    map_diesel_error(
        error,
        CatalogueQueryError::query,
        CatalogueQueryError::connection,
    )
}

fn invalid_row(err: impl std::fmt::Display) -> CatalogueQueryError {
    CatalogueQueryError::query(format!("invalid stored row: {err}"))
}

const LIST_WINES_SQL: &str = "\
    SELECT w.id, w.name, w.year, w.grape, d.name AS domaine_name, \
           COUNT(r.id) AS reviews_count, \
           ROUND(AVG(r.rating), 2)::float8 AS avg_rating \
    FROM wines w \
    JOIN domains d ON d.id = w.domaine_id \
    LEFT JOIN reviews r ON r.wine_id = w.id \
    WHERE ($1 = '' OR w.name ILIKE $2 OR d.name ILIKE $2 OR COALESCE(w.grape, '') ILIKE $2) \
      AND ($3 = 0 OR w.domaine_id = $3) \
    GROUP BY w.id, w.name, w.year, w.grape, w.created_at, d.name \
    ORDER BY w.created_at DESC";

const WINE_STATS_SQL: &str = "\
    SELECT COUNT(r.id) AS count, ROUND(AVG(r.rating), 2)::float8 AS avg \
    FROM reviews r WHERE r.wine_id = $1";

#[derive(QueryableByName)]
struct WineSummaryRow {
    #[diesel(sql_type = Integer)]
    id: i32,
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Nullable<Integer>)]
    year: Option<i32>,
    #[diesel(sql_type = Nullable<Text>)]
    grape: Option<String>,
    #[diesel(sql_type = Text)]
    domaine_name: String,
    #[diesel(sql_type = BigInt)]
    reviews_count: i64,
    #[diesel(sql_type = Nullable<Double>)]
    avg_rating: Option<f64>,
}

impl From<WineSummaryRow> for WineSummary {
    fn from(row: WineSummaryRow) -> Self {
        Self {
            id: WineId::new(row.id),
            name: row.name,
            year: row.year,
            grape: row.grape,
            domaine_name: row.domaine_name,
            reviews_count: row.reviews_count,
            avg_rating: row.avg_rating,
        }
    }
}

#[derive(QueryableByName)]
struct WineStatsRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
    #[diesel(sql_type = Nullable<Double>)]
    avg: Option<f64>,
}

#[async_trait]
impl CatalogueQuery for DieselCatalogue {
    async fn list_domaines_by_name(&self) -> Result<Vec<Domaine>, CatalogueQueryError> {
        let mut conn = self.conn().await?;
        let rows: Vec<DomaineRow> = domains::table
            .order(domains::name.asc())
            .select(DomaineRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(rows.into_iter().map(Domaine::from).collect())
    }

    async fn list_domaines_newest(&self) -> Result<Vec<Domaine>, CatalogueQueryError> {
        let mut conn = self.conn().await?;
        let rows: Vec<DomaineRow> = domains::table
            .order(domains::created_at.desc())
            .select(DomaineRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(rows.into_iter().map(Domaine::from).collect())
    }

    async fn list_wines(
        &self,
        filter: &WineFilter,
    ) -> Result<Vec<WineSummary>, CatalogueQueryError> {
        let mut conn = self.conn().await?;
        let query = filter.query.clone().unwrap_or_default();
        let pattern = format!("%{query}%");
        // Serial ids start at 1, so 0 doubles as "no domaine filter".
        let domaine_id = filter.domaine_id.map_or(0, DomaineId::get);

        let rows: Vec<WineSummaryRow> = diesel::sql_query(LIST_WINES_SQL)
            .bind::<Text, _>(query)
            .bind::<Text, _>(pattern)
            .bind::<Integer, _>(domaine_id)
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(rows.into_iter().map(WineSummary::from).collect())
    }

    async fn wine_detail(&self, id: WineId) -> Result<Option<WineDetail>, CatalogueQueryError> {
        let mut conn = self.conn().await?;
        let row: Option<(WineRow, String, Option<String>, Option<String>)> = wines::table
            .inner_join(domains::table)
            .filter(wines::id.eq(id.get()))
            .select((
                WineRow::as_select(),
                domains::name,
                domains::region,
                domains::country,
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        Ok(row.map(|(wine, domaine_name, region, country)| WineDetail {
            id: WineId::new(wine.id),
            domaine_id: DomaineId::new(wine.domaine_id),
            name: wine.name,
            year: wine.year,
            grape: wine.grape,
            description_md: wine.description_md,
            domaine_name,
            region,
            country,
        }))
    }

    async fn wine_stats(&self, id: WineId) -> Result<WineStats, CatalogueQueryError> {
        let mut conn = self.conn().await?;
        let row: WineStatsRow = diesel::sql_query(WINE_STATS_SQL)
            .bind::<Integer, _>(id.get())
            .get_result(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(WineStats {
            count: row.count,
            avg: row.avg,
        })
    }

    async fn reviews_for_wine(
        &self,
        id: WineId,
    ) -> Result<Vec<WineReview>, CatalogueQueryError> {
        let mut conn = self.conn().await?;
        let rows: Vec<(ReviewRow, String)> = reviews::table
            .inner_join(users::table)
            .filter(reviews::wine_id.eq(id.get()))
            .order(reviews::created_at.desc())
            .select((ReviewRow::as_select(), users::username))
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        rows.into_iter()
            .map(|(row, username)| {
                Ok(WineReview {
                    id: ReviewId::new(row.id),
                    rating: Rating::new(row.rating).map_err(invalid_row)?,
                    comment: row.comment,
                    created_at: row.created_at,
                    user_id: UserId::new(row.user_id),
                    username,
                })
            })
            .collect()
    }

    async fn review_for_user(
        &self,
        wine_id: WineId,
        user_id: UserId,
    ) -> Result<Option<Review>, CatalogueQueryError> {
        let mut conn = self.conn().await?;
        let row: Option<ReviewRow> = reviews::table
            .filter(reviews::wine_id.eq(wine_id.get()))
            .filter(reviews::user_id.eq(user_id.get()))
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        row.map(|r| r.into_domain().map_err(invalid_row)).transpose()
    }

    async fn reviews_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<UserReview>, CatalogueQueryError> {
        let mut conn = self.conn().await?;
        let rows: Vec<(ReviewRow, String, Option<i32>, i32, String)> = reviews::table
            .inner_join(wines::table.inner_join(domains::table))
            .filter(reviews::user_id.eq(user_id.get()))
            .order(reviews::created_at.desc())
            .select((
                ReviewRow::as_select(),
                wines::name,
                wines::year,
                domains::id,
                domains::name,
            ))
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        rows.into_iter()
            .map(|(row, wine_name, year, domaine_id, domaine_name)| {
                Ok(UserReview {
                    id: ReviewId::new(row.id),
                    rating: Rating::new(row.rating).map_err(invalid_row)?,
                    comment: row.comment,
                    created_at: row.created_at,
                    wine_id: WineId::new(row.wine_id),
                    wine_name,
                    year,
                    domaine_id: DomaineId::new(domaine_id),
                    domaine_name,
                })
            })
            .collect()
    }
}

#[async_trait]
impl CatalogueCommand for DieselCatalogue {
    async fn create_domaine(&self, draft: &DomaineDraft) -> Result<(), CatalogueCommandError> {
        let mut conn = self.conn().await?;
        let row = NewDomaineRow {
            name: &draft.name,
            region: draft.region.as_deref(),
            country: draft.country.as_deref(),
        };
        diesel::insert_into(domains::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn get_domaine(
        &self,
        id: DomaineId,
    ) -> Result<Option<Domaine>, CatalogueCommandError> {
        let mut conn = self.conn().await?;
        let row: Option<DomaineRow> = domains::table
            .find(id.get())
            .select(DomaineRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;
        Ok(row.map(Domaine::from))
    }

    async fn update_domaine(
        &self,
        id: DomaineId,
        draft: &DomaineDraft,
    ) -> Result<(), CatalogueCommandError> {
        let mut conn = self.conn().await?;
        let changes = DomaineUpdate {
            name: &draft.name,
            region: draft.region.as_deref(),
            country: draft.country.as_deref(),
        };
        diesel::update(domains::table.find(id.get()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn delete_domaine(&self, id: DomaineId) -> Result<(), CatalogueCommandError> {
        let mut conn = self.conn().await?;
        // FK cascade removes the wines and their reviews.
        diesel::delete(domains::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn create_wine(&self, draft: &WineDraft) -> Result<(), CatalogueCommandError> {
        let mut conn = self.conn().await?;
        let row = NewWineRow {
            domaine_id: draft.domaine_id.get(),
            name: &draft.name,
            year: draft.year,
            grape: draft.grape.as_deref(),
            description_md: draft.description_md.as_deref(),
        };
        diesel::insert_into(wines::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn get_wine(&self, id: WineId) -> Result<Option<Wine>, CatalogueCommandError> {
        let mut conn = self.conn().await?;
        let row: Option<WineRow> = wines::table
            .find(id.get())
            .select(WineRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;
        Ok(row.map(Wine::from))
    }

    async fn update_wine(
        &self,
        id: WineId,
        draft: &WineDraft,
    ) -> Result<(), CatalogueCommandError> {
        let mut conn = self.conn().await?;
        let changes = WineUpdate {
            domaine_id: draft.domaine_id.get(),
            name: &draft.name,
            year: draft.year,
            grape: draft.grape.as_deref(),
            description_md: draft.description_md.as_deref(),
        };
        diesel::update(wines::table.find(id.get()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn delete_wine(&self, id: WineId) -> Result<(), CatalogueCommandError> {
        let mut conn = self.conn().await?;
        diesel::delete(wines::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(())
    }
}
