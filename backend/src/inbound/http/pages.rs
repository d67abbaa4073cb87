//! Public catalogue pages: wine listing with search, and the wine detail
//! page with its reviews and derived aggregates.

use actix_web::{HttpResponse, get, web};
use minijinja::context;
use serde::Deserialize;

use crate::domain::{DomaineId, Error, WineFilter, WineId};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::templates;

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub domaine: Option<String>,
}

/// Parse the optional domaine filter leniently: absent, blank, or
/// non-numeric input simply means no filter.
fn parse_domaine_filter(raw: Option<&str>) -> Option<DomaineId> {
    raw.and_then(|value| value.trim().parse::<i32>().ok())
        .map(DomaineId::new)
}

#[get("/")]
pub async fn index(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListingQuery>,
) -> ApiResult<HttpResponse> {
    let filter = WineFilter::new(query.q.as_deref(), parse_domaine_filter(query.domaine.as_deref()));
    let wines = state
        .catalogue
        .list_wines(&filter)
        .await
        .map_err(Error::from)?;
    let domaines = state
        .catalogue
        .list_domaines_by_name()
        .await
        .map_err(Error::from)?;

    templates::page(
        "index.html",
        context! {
            current_user => session.current_user(),
            wines => wines,
            domaines => domaines,
            query => filter.query.as_deref().unwrap_or(""),
            domaine_id => filter.domaine_id,
        },
    )
}

#[get("/wines/{id}")]
pub async fn wine_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let wine_id = WineId::new(path.into_inner());
    let wine = state
        .catalogue
        .wine_detail(wine_id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("wine not found"))?;

    let stats = state
        .catalogue
        .wine_stats(wine_id)
        .await
        .map_err(Error::from)?;
    let reviews = state
        .catalogue
        .reviews_for_wine(wine_id)
        .await
        .map_err(Error::from)?;

    let current_user = session.current_user();
    let own_review = match &current_user {
        Some(user) => state
            .catalogue
            .review_for_user(wine_id, user.id)
            .await
            .map_err(Error::from)?,
        None => None,
    };

    templates::page(
        "wine_detail.html",
        context! {
            current_user => current_user,
            wine => wine,
            stats => stats,
            reviews => reviews,
            own_review => own_review,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomaineDraft, WineDraft};
    use crate::inbound::http::test_utils::{memory_app, read_html};
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_web::test]
    async fn index_lists_wines_with_their_domaine() {
        let (app, store) = memory_app().await;
        let domaine_id = store
            .seed_domaine(DomaineDraft::new("Domaine Leflaive", None, Some("France")).expect("draft"))
            .await;
        store
            .seed_wine(
                WineDraft::new(domaine_id, "Montrachet", Some(2019), Some("Chardonnay"), None)
                    .expect("draft"),
            )
            .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = read_html(res).await;
        assert!(body.contains("Montrachet"));
        assert!(body.contains("Domaine Leflaive"));
    }

    #[actix_web::test]
    async fn search_narrows_the_listing() {
        let (app, store) = memory_app().await;
        let domaine_id = store
            .seed_domaine(DomaineDraft::new("Domaine Leflaive", None, None).expect("draft"))
            .await;
        for name in ["Montrachet", "Pouilly"] {
            store
                .seed_wine(WineDraft::new(domaine_id, name, None, None, None).expect("draft"))
                .await;
        }

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/?q=montrachet").to_request(),
        )
        .await;
        let body = read_html(res).await;
        assert!(body.contains("Montrachet"));
        assert!(!body.contains("Pouilly"));
    }

    #[actix_web::test]
    async fn missing_wine_is_not_found() {
        let (app, _store) = memory_app().await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/wines/999").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn detail_renders_markdown_description_as_html() {
        let (app, store) = memory_app().await;
        let domaine_id = store
            .seed_domaine(DomaineDraft::new("Domaine Test", None, None).expect("draft"))
            .await;
        let wine_id = store
            .seed_wine(
                WineDraft::new(domaine_id, "Cuvée", None, None, Some("**superb** fruit"))
                    .expect("draft"),
            )
            .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/wines/{wine_id}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = read_html(res).await;
        assert!(body.contains("<strong>superb</strong>"));
    }
}
