//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Produces PHC strings (`$argon2id$...`) with a fresh random salt per call.
//! The hash work runs on the blocking pool so a deliberately slow hash never
//! stalls unrelated requests on the async workers.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id-backed credential hasher with default parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError> {
        let plaintext = Zeroizing::new(plaintext.to_owned());
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|err| PasswordHashError::hash(err.to_string()))
        })
        .await
        .map_err(|err| PasswordHashError::hash(format!("hash task failed: {err}")))?
    }

    async fn verify(&self, plaintext: &str, phc: &str) -> Result<bool, PasswordHashError> {
        let plaintext = Zeroizing::new(plaintext.to_owned());
        let phc = phc.to_owned();
        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&phc)
                .map_err(|err| PasswordHashError::hash(format!("malformed stored hash: {err}")))?;
            match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(err) => Err(PasswordHashError::hash(err.to_string())),
            }
        })
        .await
        .map_err(|err| PasswordHashError::hash(format!("verify task failed: {err}")))?
    }
}
