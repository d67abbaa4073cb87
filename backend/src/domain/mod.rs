//! Domain entities, services, and ports.
//!
//! Everything in this module is transport and storage agnostic: no actix or
//! diesel imports. Inbound adapters translate HTTP forms into these types and
//! outbound adapters implement the [`ports`] traits.

pub mod account_service;
pub mod catalogue;
pub mod credentials;
pub mod error;
pub mod ids;
pub mod ports;
pub mod review;
pub mod review_service;
pub mod user;

pub use self::account_service::{AccountService, INVALID_CREDENTIALS};
pub use self::catalogue::{
    CatalogueValidationError, DOMAINE_NAME_MIN, Domaine, DomaineDraft, Wine, WineDetail,
    WineDraft, WineFilter, WineSummary,
};
pub use self::credentials::{CredentialsError, LoginCredentials, PASSWORD_MIN, Registration};
pub use self::error::{Error, ErrorCode};
pub use self::ids::{DomaineId, ReviewId, UserId, WineId};
pub use self::review::{
    RATING_MAX, RATING_MIN, Rating, Review, ReviewUpsert, ReviewValidationError, UserReview,
    WineReview, WineStats, normalize_comment,
};
pub use self::review_service::ReviewService;
pub use self::user::{CurrentUser, Role, StoredUser, USERNAME_MIN, UserValidationError, Username};

/// Convenient result alias for domain operations.
pub type ApiResult<T> = Result<T, Error>;
