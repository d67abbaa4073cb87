//! Driven port for user account storage.

use async_trait::async_trait;

use crate::domain::ids::UserId;
use crate::domain::user::{StoredUser, Username};

/// Errors surfaced by a [`UserRepository`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// The username is already taken (unique-index violation).
    ///
    /// The application pre-checks before inserting, but the index closes the
    /// race between two concurrent registrations.
    #[error("username already taken")]
    DuplicateUsername,

    /// Could not reach the backing store.
    #[error("user store unavailable: {message}")]
    Connection { message: String },

    /// The store rejected or failed the operation.
    #[error("user store error: {message}")]
    Query { message: String },
}

impl UserRepositoryError {
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

/// Storage port for user accounts.
///
/// Accounts are created at registration and never destroyed by the
/// application; role changes happen out-of-band via the `make-admin` tool.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user with the `user` role.
    async fn create(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<StoredUser, UserRepositoryError>;

    /// Look up an account by exact username.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserRepositoryError>;

    /// Look up an account by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<StoredUser>, UserRepositoryError>;
}
