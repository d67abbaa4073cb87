//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix session so handlers deal in domain terms: persist the
//! logged-in user, ask who is logged in, require a login or an admin.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{CurrentUser, Error};

pub(crate) const USER_KEY: &str = "user";

/// Newtype wrapper exposing higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user in the session cookie.
    pub fn persist_user(&self, user: &CurrentUser) -> Result<(), Error> {
        self.0
            .insert(USER_KEY, user)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the logged-in user from the session, if any.
    ///
    /// A cookie that fails to deserialise is treated as no login rather than
    /// an error; stale cookies from older releases should not lock anyone out.
    pub fn current_user(&self) -> Option<CurrentUser> {
        match self.0.get::<CurrentUser>(USER_KEY) {
            Ok(user) => user,
            Err(error) => {
                tracing::warn!(%error, "unreadable user entry in session cookie");
                None
            }
        }
    }

    /// Require a logged-in user; anonymous visitors get redirected to login.
    pub fn require_login(&self) -> Result<CurrentUser, Error> {
        self.current_user()
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require a logged-in admin.
    pub fn require_admin(&self) -> Result<CurrentUser, Error> {
        let user = self.require_login()?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(Error::forbidden("admin access required"))
        }
    }

    /// Drop all session state (logout).
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
