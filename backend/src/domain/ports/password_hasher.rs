//! Driven port for password hashing and verification.

use async_trait::async_trait;

/// Errors surfaced by a [`PasswordHasher`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordHashError {
    /// Hashing or verification machinery failed (not a wrong password).
    #[error("password hashing failed: {message}")]
    Hash { message: String },
}

impl PasswordHashError {
    /// Create a hash error with the given message.
    pub fn hash(message: impl Into<String>) -> Self {
        Self::Hash {
            message: message.into(),
        }
    }
}

/// One-way credential hashing.
///
/// `hash` must salt per call, so two hashes of the same plaintext differ;
/// `verify` is the only way to compare. Implementations should run the work
/// off the async request path because a hash takes tens of milliseconds by
/// design.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into an opaque PHC string.
    async fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError>;

    /// Verify a plaintext password against a stored PHC string.
    ///
    /// Returns `Ok(false)` for a wrong password; `Err` only for machinery
    /// failures such as a malformed stored hash.
    async fn verify(&self, plaintext: &str, phc: &str) -> Result<bool, PasswordHashError>;
}
