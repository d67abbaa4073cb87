//! Registration and login use-cases.

use std::sync::Arc;

use tracing::debug;

use super::credentials::{LoginCredentials, Registration};
use super::error::Error;
use super::ports::{PasswordHashError, PasswordHasher, UserRepository, UserRepositoryError};
use super::user::{CurrentUser, StoredUser};

/// User-facing login failure message.
///
/// Deliberately identical for "no such user" and "wrong password" so the
/// login form cannot be used to enumerate usernames.
pub const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account service implementing registration and authentication.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountService {
    /// Create a new service over a user store and a credential hasher.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Register a new account with the `user` role.
    ///
    /// The username is pre-checked for uniqueness; the store's unique index
    /// closes the race between two concurrent registrations, and both paths
    /// surface the same conflict error.
    pub async fn register(&self, registration: &Registration) -> Result<StoredUser, Error> {
        let username = registration.username();
        if self
            .users
            .find_by_username(username.as_ref())
            .await
            .map_err(map_user_error)?
            .is_some()
        {
            return Err(duplicate_username());
        }

        let password_hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hash_error)?;

        match self.users.create(username, &password_hash).await {
            Ok(user) => {
                debug!(username = %user.username, "account registered");
                Ok(user)
            }
            Err(UserRepositoryError::DuplicateUsername) => Err(duplicate_username()),
            Err(err) => Err(map_user_error(err)),
        }
    }

    /// Authenticate credentials and produce the session identity.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<CurrentUser, Error> {
        let user = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_user_error)?;

        let Some(user) = user else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &user.password_hash)
            .await
            .map_err(map_hash_error)?;

        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        Ok(CurrentUser::from(&user))
    }
}

fn duplicate_username() -> Error {
    Error::conflict("this username is already taken")
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::DuplicateUsername => duplicate_username(),
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user store error: {message}"))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    let PasswordHashError::Hash { message } = error;
    Error::internal(format!("password hashing failed: {message}"))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rstest::rstest;

    use super::*;
    use crate::domain::ids::UserId;
    use crate::domain::user::{Role, Username};
    use crate::domain::{ErrorCode, PASSWORD_MIN};

    /// Stub hasher with reversible "hashes" so tests stay fast and readable.
    struct StubHasher;

    #[async_trait]
    impl PasswordHasher for StubHasher {
        async fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError> {
            Ok(format!("hashed:{plaintext}"))
        }

        async fn verify(&self, plaintext: &str, phc: &str) -> Result<bool, PasswordHashError> {
            Ok(phc == format!("hashed:{plaintext}"))
        }
    }

    #[derive(Default)]
    struct StubUserRepository {
        users: Mutex<Vec<StoredUser>>,
    }

    impl StubUserRepository {
        fn with_user(username: &str, password: &str) -> Self {
            let repo = Self::default();
            repo.users.lock().expect("lock").push(StoredUser {
                id: UserId::new(1),
                username: Username::new(username).expect("valid"),
                password_hash: format!("hashed:{password}"),
                role: Role::User,
            });
            repo
        }
    }

    #[async_trait]
    impl UserRepository for StubUserRepository {
        async fn create(
            &self,
            username: &Username,
            password_hash: &str,
        ) -> Result<StoredUser, UserRepositoryError> {
            let mut users = self.users.lock().expect("lock");
            if users.iter().any(|u| u.username == *username) {
                return Err(UserRepositoryError::DuplicateUsername);
            }
            let user = StoredUser {
                id: UserId::new(users.len() as i32 + 1),
                username: username.clone(),
                password_hash: password_hash.to_owned(),
                role: Role::User,
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn find_by_username(
            &self,
            username: &str,
        ) -> Result<Option<StoredUser>, UserRepositoryError> {
            Ok(self
                .users
                .lock()
                .expect("lock")
                .iter()
                .find(|u| u.username.as_ref() == username)
                .cloned())
        }

        async fn find_by_id(
            &self,
            id: UserId,
        ) -> Result<Option<StoredUser>, UserRepositoryError> {
            Ok(self
                .users
                .lock()
                .expect("lock")
                .iter()
                .find(|u| u.id == id)
                .cloned())
        }
    }

    fn service(repo: StubUserRepository) -> AccountService {
        AccountService::new(Arc::new(repo), Arc::new(StubHasher))
    }

    #[tokio::test]
    async fn register_then_login_round_trips() {
        let svc = service(StubUserRepository::default());
        let registration = Registration::try_from_parts("alice", "secret1").expect("valid");
        let user = svc.register(&registration).await.expect("registered");
        assert_eq!(user.role, Role::User);
        assert!(user.password_hash.starts_with("hashed:"));

        let creds = LoginCredentials::try_from_parts("alice", "secret1").expect("valid");
        let current = svc.login(&creds).await.expect("login");
        assert_eq!(current.username, "alice");
        assert!(!current.is_admin());
    }

    #[tokio::test]
    async fn register_rejects_taken_username() {
        let svc = service(StubUserRepository::with_user("alice", "secret1"));
        let registration = Registration::try_from_parts("alice", "another6").expect("valid");
        let err = svc.register(&registration).await.expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case("nobody", "secret1")]
    #[case("alice", "wrong-password")]
    #[tokio::test]
    async fn login_failures_share_one_message(
        #[case] username: &str,
        #[case] password: &str,
    ) {
        let svc = service(StubUserRepository::with_user("alice", "secret1"));
        let creds = LoginCredentials::try_from_parts(username, password).expect("valid shape");
        let err = svc.login(&creds).await.expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        // Byte-identical in both failure modes to avoid username enumeration.
        assert_eq!(err.message(), INVALID_CREDENTIALS);
    }

    #[rstest]
    fn password_minimum_matches_registration_rule() {
        assert!(Registration::try_from_parts("alice", &"x".repeat(PASSWORD_MIN)).is_ok());
        assert!(Registration::try_from_parts("alice", &"x".repeat(PASSWORD_MIN - 1)).is_err());
    }
}
