//! Credential payloads for registration and login.
//!
//! Keep inbound form parsing outside the domain by exposing constructors that
//! validate string inputs before a handler talks to the account service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{UserValidationError, Username};

/// Minimum allowed length for a password at registration.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when credential values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    /// Username was missing or shorter than the minimum once trimmed.
    UsernameTooShort { min: usize },
    /// Password was shorter than the minimum.
    PasswordTooShort { min: usize },
    /// Username was blank once trimmed (login only).
    EmptyUsername,
    /// Password was blank (login only).
    EmptyPassword,
}

impl fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsError {}

impl From<UserValidationError> for CredentialsError {
    fn from(err: UserValidationError) -> Self {
        match err {
            UserValidationError::UsernameTooShort { min } => Self::UsernameTooShort { min },
        }
    }
}

/// Validated registration payload.
///
/// ## Invariants
/// - `username` satisfies the [`Username`] rules (trimmed, ≥ `USERNAME_MIN`).
/// - `password` is at least [`PASSWORD_MIN`] characters and kept in a
///   [`Zeroizing`] buffer so the plaintext is wiped on drop.
#[derive(Debug, Clone)]
pub struct Registration {
    username: Username,
    password: Zeroizing<String>,
}

impl Registration {
    /// Construct a registration payload from raw form inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, CredentialsError> {
        let username = Username::new(username)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(CredentialsError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username to register.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Plaintext password, only ever handed to the credential service.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated login credentials.
///
/// Login applies no length policy beyond non-emptiness: length rules bind at
/// registration, and rejecting short inputs here would leak which usernames
/// exist.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, CredentialsError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(CredentialsError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(CredentialsError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for account lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::USERNAME_MIN;
    use rstest::rstest;

    #[rstest]
    #[case("ab", "secret1", CredentialsError::UsernameTooShort { min: USERNAME_MIN })]
    #[case("alice", "short", CredentialsError::PasswordTooShort { min: PASSWORD_MIN })]
    fn registration_rejects_invalid_inputs(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: CredentialsError,
    ) {
        let err = Registration::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn registration_trims_username_and_keeps_password() {
        let reg = Registration::try_from_parts("  alice  ", "secret1").expect("valid");
        assert_eq!(reg.username().as_ref(), "alice");
        assert_eq!(reg.password(), "secret1");
    }

    #[rstest]
    #[case("", "pw", CredentialsError::EmptyUsername)]
    #[case("   ", "pw", CredentialsError::EmptyUsername)]
    #[case("alice", "", CredentialsError::EmptyPassword)]
    fn login_rejects_blank_fields(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: CredentialsError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("blank fields must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn login_accepts_short_passwords() {
        // Length policy binds at registration only.
        let creds = LoginCredentials::try_from_parts("alice", "x").expect("valid shape");
        assert_eq!(creds.password(), "x");
    }
}
