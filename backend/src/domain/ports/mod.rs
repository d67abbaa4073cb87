//! Domain ports.
//!
//! In hexagonal terms these are the seams between the domain and the outside
//! world: inbound adapters drive the services, which in turn talk to these
//! traits without knowing the backing infrastructure. Tests substitute stub
//! implementations so service behaviour stays deterministic.

mod catalogue_command;
mod catalogue_query;
mod password_hasher;
mod review_repository;
mod user_repository;

pub use catalogue_command::{CatalogueCommand, CatalogueCommandError};
pub use catalogue_query::{CatalogueQuery, CatalogueQueryError};
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use review_repository::{ReviewRepository, ReviewRepositoryError};
pub use user_repository::{UserRepository, UserRepositoryError};
