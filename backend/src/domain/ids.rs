//! Typed row identifiers.
//!
//! The persistence layer uses serial integer keys; these newtypes stop a
//! `wine_id` from being handed to an operation expecting a `user_id`.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw database key.
            pub const fn new(raw: i32) -> Self {
                Self(raw)
            }

            /// Raw database key.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self(raw)
            }
        }
    };
}

define_id!(
    /// Identifier of a registered user.
    UserId
);
define_id!(
    /// Identifier of a wine-producing domaine.
    DomaineId
);
define_id!(
    /// Identifier of a wine.
    WineId
);
define_id!(
    /// Identifier of a review.
    ReviewId
);
