//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::warn;

use crate::domain::{AccountService, ReviewService};
use crate::inbound::http::{HttpState, configure_routes};
use crate::middleware::Trace;
use crate::outbound::persistence::{
    DieselCatalogue, DieselReviewRepository, DieselUserRepository,
};
use crate::outbound::{Argon2PasswordHasher, MemoryStore};

/// Build the handler state from configuration.
///
/// With a database pool, every port is Diesel-backed; without one the whole
/// catalogue lives in a single in-memory store.
fn build_http_state(config: &ServerConfig) -> HttpState {
    let hasher = Arc::new(Argon2PasswordHasher::default());
    match &config.db_pool {
        Some(pool) => HttpState::new(
            AccountService::new(Arc::new(DieselUserRepository::new(pool.clone())), hasher),
            ReviewService::new(Arc::new(DieselReviewRepository::new(pool.clone()))),
            Arc::new(DieselCatalogue::new(pool.clone())),
            Arc::new(DieselCatalogue::new(pool.clone())),
        ),
        None => {
            warn!("no database configured; using a volatile in-memory store");
            let store = MemoryStore::new();
            HttpState::new(
                AccountService::new(Arc::new(store.clone()), hasher),
                ReviewService::new(Arc::new(store.clone())),
                Arc::new(store.clone()),
                Arc::new(store),
            )
        }
    }
}

#[derive(Clone)]
struct AppDependencies {
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    App::new()
        .app_data(http_state)
        .wrap(session)
        .wrap(Trace)
        .configure(configure_routes)
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config));
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}
