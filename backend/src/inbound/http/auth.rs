//! Registration, login, and logout pages.
//!
//! Validation failures re-render the form with the submitted username still
//! in place; only the password is dropped. Failed logins always show the
//! same message regardless of whether the username exists.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, get, post, web};
use minijinja::context;
use serde::{Deserialize, Serialize};

use crate::domain::{CurrentUser, ErrorCode, LoginCredentials, Registration};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::templates;

#[derive(Debug, Deserialize, Serialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[get("/register")]
pub async fn register_form(session: SessionContext) -> ApiResult<HttpResponse> {
    templates::page(
        "register.html",
        context! {
            current_user => session.current_user(),
            username => "",
            error => minijinja::Value::UNDEFINED,
        },
    )
}

#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<CredentialsForm>,
) -> ApiResult<HttpResponse> {
    let registration = match Registration::try_from_parts(&form.username, &form.password) {
        Ok(registration) => registration,
        Err(error) => {
            return templates::page_with_status(
                StatusCode::BAD_REQUEST,
                "register.html",
                context! {
                    current_user => session.current_user(),
                    username => &form.username,
                    error => error.to_string(),
                },
            );
        }
    };

    match state.accounts.register(&registration).await {
        Ok(user) => {
            session.persist_user(&CurrentUser::from(&user))?;
            Ok(see_other("/"))
        }
        Err(error) if error.code() == ErrorCode::Conflict => templates::page_with_status(
            StatusCode::CONFLICT,
            "register.html",
            context! {
                current_user => session.current_user(),
                username => &form.username,
                error => error.message(),
            },
        ),
        Err(error) => Err(error),
    }
}

#[get("/login")]
pub async fn login_form(session: SessionContext) -> ApiResult<HttpResponse> {
    templates::page(
        "login.html",
        context! {
            current_user => session.current_user(),
            username => "",
            error => minijinja::Value::UNDEFINED,
        },
    )
}

#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<CredentialsForm>,
) -> ApiResult<HttpResponse> {
    let rerender = |message: &str| {
        templates::page_with_status(
            StatusCode::UNAUTHORIZED,
            "login.html",
            context! {
                current_user => minijinja::Value::UNDEFINED,
                username => &form.username,
                error => message,
            },
        )
    };

    let credentials = match LoginCredentials::try_from_parts(&form.username, &form.password) {
        Ok(credentials) => credentials,
        // Malformed input authenticates like a wrong password: same message,
        // no hint about which part was rejected.
        Err(_) => return rerender(crate::domain::INVALID_CREDENTIALS),
    };

    match state.accounts.login(&credentials).await {
        Ok(user) => {
            session.persist_user(&user)?;
            Ok(see_other("/"))
        }
        Err(error) if error.code() == ErrorCode::Unauthorized => rerender(error.message()),
        Err(error) => Err(error),
    }
}

#[get("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear();
    Ok(see_other("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{memory_app, read_html, session_cookie};
    use actix_web::test;

    #[actix_web::test]
    async fn register_then_login_round_trip() {
        let (app, _store) = memory_app().await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_form(CredentialsForm {
                    username: "alice".into(),
                    password: "secret1".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert!(session_cookie(&res).is_some(), "registration logs in");

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_form(CredentialsForm {
                    username: "alice".into(),
                    password: "secret1".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get(header::LOCATION).expect("location"),
            "/"
        );
    }

    #[actix_web::test]
    async fn duplicate_username_rerenders_with_conflict() {
        let (app, _store) = memory_app().await;

        for _ in 0..2 {
            let res = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/register")
                    .set_form(CredentialsForm {
                        username: "alice".into(),
                        password: "secret1".into(),
                    })
                    .to_request(),
            )
            .await;
            if res.status() == StatusCode::CONFLICT {
                let body = read_html(res).await;
                assert!(body.contains("this username is already taken"));
                assert!(body.contains("alice"), "username field is preserved");
                return;
            }
            assert_eq!(res.status(), StatusCode::SEE_OTHER);
        }
        panic!("second registration should conflict");
    }

    #[actix_web::test]
    async fn unknown_user_and_wrong_password_fail_identically() {
        let (app, _store) = memory_app().await;

        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_form(CredentialsForm {
                    username: "alice".into(),
                    password: "secret1".into(),
                })
                .to_request(),
        )
        .await;

        let mut bodies = Vec::new();
        for (username, password) in [("alice", "wrong-password"), ("nobody", "whatever")] {
            let res = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/login")
                    .set_form(CredentialsForm {
                        username: username.into(),
                        password: password.into(),
                    })
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            bodies.push(read_html(res).await);
        }
        assert!(bodies[0].contains(crate::domain::INVALID_CREDENTIALS));
        // Same template, same message; only the echoed username differs.
        assert_eq!(
            bodies[0].matches(crate::domain::INVALID_CREDENTIALS).count(),
            bodies[1].matches(crate::domain::INVALID_CREDENTIALS).count(),
        );
    }

    #[actix_web::test]
    async fn short_password_rerenders_with_the_username_kept() {
        let (app, _store) = memory_app().await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_form(CredentialsForm {
                    username: "alice".into(),
                    password: "short".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = read_html(res).await;
        assert!(body.contains("alice"));
        assert!(!body.contains("short\""), "password is never echoed");
    }

    #[actix_web::test]
    async fn logout_clears_the_session() {
        let (app, _store) = memory_app().await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_form(CredentialsForm {
                    username: "alice".into(),
                    password: "secret1".into(),
                })
                .to_request(),
        )
        .await;
        let cookie = session_cookie(&res).expect("logged in");

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/logout")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        // The guard now treats the visitor as anonymous.
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/me/reviews").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get(header::LOCATION).expect("location"),
            "/login"
        );
    }
}
