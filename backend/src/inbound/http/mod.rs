//! HTTP adapter: handlers, session helpers, error mapping, and templates.

pub mod admin;
pub mod auth;
pub mod error;
pub mod pages;
pub mod reviews;
pub mod session;
pub mod state;
pub mod templates;
#[cfg(test)]
pub mod test_utils;

pub use error::{ApiResult, LOGIN_PATH};
pub use state::HttpState;

use actix_web::web;

/// Register every route on the given service config.
///
/// Shared between the production server and test applications so both see
/// the same routing table.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(pages::index)
        .service(pages::wine_detail)
        .service(auth::register_form)
        .service(auth::register)
        .service(auth::login_form)
        .service(auth::login)
        .service(auth::logout)
        .service(reviews::submit_review)
        .service(reviews::delete_review)
        .service(reviews::my_reviews)
        .service(admin::admin_home)
        .service(admin::list_domaines)
        .service(admin::new_domaine_form)
        .service(admin::create_domaine)
        .service(admin::edit_domaine_form)
        .service(admin::update_domaine)
        .service(admin::delete_domaine)
        .service(admin::list_wines)
        .service(admin::new_wine_form)
        .service(admin::create_wine)
        .service(admin::edit_wine_form)
        .service(admin::update_wine)
        .service(admin::delete_wine);
}
