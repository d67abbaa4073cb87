//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer, never exposed to the
//! domain; repositories translate between these and domain types.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    Domaine, DomaineId, Review, ReviewId, Role, StoredUser, UserId, Username, Wine, WineId,
};

use super::schema::{domains, reviews, users, wines};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

impl UserRow {
    /// Translate into the domain account, tolerating legacy role strings.
    pub(crate) fn into_domain(self) -> Result<StoredUser, crate::domain::UserValidationError> {
        Ok(StoredUser {
            id: UserId::new(self.id),
            username: Username::new(&self.username)?,
            password_hash: self.password_hash,
            role: Role::from_str_lossy(&self.role),
        })
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

// ---------------------------------------------------------------------------
// Domaines
// ---------------------------------------------------------------------------

/// Row struct for reading from the domains table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = domains)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DomaineRow {
    pub id: i32,
    pub name: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DomaineRow> for Domaine {
    fn from(row: DomaineRow) -> Self {
        Self {
            id: DomaineId::new(row.id),
            name: row.name,
            region: row.region,
            country: row.country,
            created_at: row.created_at,
        }
    }
}

/// Insertable struct for creating new domaine records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = domains)]
pub(crate) struct NewDomaineRow<'a> {
    pub name: &'a str,
    pub region: Option<&'a str>,
    pub country: Option<&'a str>,
}

/// Changeset struct for updating existing domaine records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = domains)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct DomaineUpdate<'a> {
    pub name: &'a str,
    pub region: Option<&'a str>,
    pub country: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Wines
// ---------------------------------------------------------------------------

/// Row struct for reading from the wines table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = wines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WineRow {
    pub id: i32,
    pub domaine_id: i32,
    pub name: String,
    pub year: Option<i32>,
    pub grape: Option<String>,
    pub description_md: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<WineRow> for Wine {
    fn from(row: WineRow) -> Self {
        Self {
            id: WineId::new(row.id),
            domaine_id: DomaineId::new(row.domaine_id),
            name: row.name,
            year: row.year,
            grape: row.grape,
            description_md: row.description_md,
            created_at: row.created_at,
        }
    }
}

/// Insertable struct for creating new wine records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = wines)]
pub(crate) struct NewWineRow<'a> {
    pub domaine_id: i32,
    pub name: &'a str,
    pub year: Option<i32>,
    pub grape: Option<&'a str>,
    pub description_md: Option<&'a str>,
}

/// Changeset struct for updating existing wine records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = wines)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct WineUpdate<'a> {
    pub domaine_id: i32,
    pub name: &'a str,
    pub year: Option<i32>,
    pub grape: Option<&'a str>,
    pub description_md: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

/// Row struct for reading from the reviews table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: i32,
    pub wine_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReviewRow {
    /// Translate into the domain review.
    ///
    /// The CHECK constraint keeps stored ratings in range, so a violation
    /// here means the row was tampered with outside the application.
    pub(crate) fn into_domain(self) -> Result<Review, crate::domain::ReviewValidationError> {
        Ok(Review {
            id: ReviewId::new(self.id),
            wine_id: WineId::new(self.wine_id),
            user_id: UserId::new(self.user_id),
            rating: crate::domain::Rating::new(self.rating)?,
            comment: self.comment,
            created_at: self.created_at,
        })
    }
}

/// Insertable struct for the review upsert.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow<'a> {
    pub wine_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub comment: Option<&'a str>,
}
