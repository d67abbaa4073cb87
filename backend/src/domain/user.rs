//! User identity and role model.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;

/// Validation errors returned by [`Username::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Username was shorter than [`USERNAME_MIN`] once trimmed.
    UsernameTooShort { min: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Validated username.
///
/// ## Invariants
/// - Trimmed of surrounding whitespace.
/// - At least [`USERNAME_MIN`] characters long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.chars().count() < USERNAME_MIN {
            return Err(UserValidationError::UsernameTooShort { min: USERNAME_MIN });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Role attached to a user account.
///
/// Exactly two tiers exist; promotion to admin happens only through the
/// out-of-process `make-admin` tool, never through the application's own
/// routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Database representation of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parse the database representation, defaulting unknown values to
    /// [`Role::User`] so a corrupt row never grants admin rights.
    pub fn from_str_lossy(raw: &str) -> Self {
        match raw {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account as stored, including the password hash.
///
/// Only the account service sees this; handlers work with [`CurrentUser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: UserId,
    pub username: Username,
    pub password_hash: String,
    pub role: Role,
}

/// The authenticated identity carried through a request.
///
/// Serialised into the session cookie on login and passed explicitly into
/// every protected domain operation; there is no ambient current-user state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    /// Whether this identity may perform admin-only operations.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&StoredUser> for CurrentUser {
    fn from(user: &StoredUser) -> Self {
        Self {
            id: user.id,
            username: user.username.to_string(),
            role: user.role,
        }
    }
}
