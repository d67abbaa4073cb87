//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};

use crate::domain::{AccountService, ReviewService};
use crate::inbound::http::state::HttpState;
use crate::outbound::{Argon2PasswordHasher, MemoryStore};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Build a fully-routed application over an in-memory store.
///
/// Returns the initialised service and the store so tests can seed the
/// catalogue directly.
pub async fn memory_app() -> (
    impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    MemoryStore,
) {
    let store = MemoryStore::new();
    let state = HttpState::new(
        AccountService::new(
            Arc::new(store.clone()),
            Arc::new(Argon2PasswordHasher::default()),
        ),
        ReviewService::new(Arc::new(store.clone())),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
    );
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .configure(crate::inbound::http::configure_routes),
    )
    .await;
    (app, store)
}

/// Extract the session cookie from a response, if one was set.
pub fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned())
}

/// Read a response body as UTF-8 text.
pub async fn read_html(res: ServiceResponse) -> String {
    let bytes = test::read_body(res).await;
    String::from_utf8_lossy(&bytes).into_owned()
}

const TEST_PASSWORD: &str = "secret1";

async fn post_credentials<S>(app: &S, uri: &str, username: &str) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    test::call_service(
        app,
        test::TestRequest::post()
            .uri(uri)
            .set_form([("username", username), ("password", TEST_PASSWORD)])
            .to_request(),
    )
    .await
}

/// Register (or re-login) a user and return their session cookie.
pub async fn login_as<S>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = post_credentials(app, "/register", username).await;
    if res.status() == StatusCode::SEE_OTHER {
        return session_cookie(&res).expect("session cookie after registration");
    }
    let res = post_credentials(app, "/login", username).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER, "login should succeed");
    session_cookie(&res).expect("session cookie after login")
}

/// Register a user, promote them to admin in the store, and log in again so
/// the session cookie carries the admin role.
pub async fn login_as_admin<S>(app: &S, store: &MemoryStore, username: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    login_as(app, username).await;
    assert!(
        store.promote_to_admin(username).await,
        "user should exist before promotion"
    );
    let res = post_credentials(app, "/login", username).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER, "admin login succeeds");
    session_cookie(&res).expect("session cookie after admin login")
}
