//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Thin adapters only: repositories translate between Diesel rows and domain
//! types, with no business logic. Row structs (`models`) are internal
//! implementation details; the table definitions (`schema`) are shared with
//! the `make-admin` tool. Connections come from a `bb8` pool via
//! `diesel-async`.

mod diesel_catalogue;
mod diesel_review_repository;
mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
pub mod schema;

pub use diesel_catalogue::DieselCatalogue;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
