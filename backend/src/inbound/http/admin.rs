//! Admin-only catalogue management: domaine and wine CRUD.
//!
//! Every handler passes the admin guard first; deletes cascade in the store
//! (a domaine takes its wines, a wine takes its reviews).

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, get, post, web};
use minijinja::context;
use serde::{Deserialize, Serialize};

use crate::domain::{DomaineDraft, DomaineId, Error, WineDraft, WineId};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::templates;

#[derive(Debug, Deserialize, Serialize)]
pub struct DomaineForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WineForm {
    #[serde(default)]
    pub domaine_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub grape: String,
    #[serde(default)]
    pub description_md: String,
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn opt(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

impl DomaineForm {
    fn to_draft(&self) -> Result<DomaineDraft, Error> {
        DomaineDraft::new(&self.name, opt(&self.region), opt(&self.country))
            .map_err(|error| Error::invalid_request(error.to_string()))
    }
}

impl WineForm {
    fn to_draft(&self) -> Result<WineDraft, Error> {
        let domaine_id = self
            .domaine_id
            .trim()
            .parse::<i32>()
            .map(DomaineId::new)
            .map_err(|_| Error::invalid_request("a domaine must be selected"))?;
        let year = match opt(&self.year) {
            Some(raw) => Some(
                raw.parse::<i32>()
                    .map_err(|_| Error::invalid_request("year must be a number"))?,
            ),
            None => None,
        };
        WineDraft::new(
            domaine_id,
            &self.name,
            year,
            opt(&self.grape),
            opt(&self.description_md),
        )
        .map_err(|error| Error::invalid_request(error.to_string()))
    }
}

#[get("/admin")]
pub async fn admin_home(session: SessionContext) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    Ok(see_other("/admin/wines"))
}

#[get("/admin/domaines")]
pub async fn list_domaines(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = session.require_admin()?;
    let domaines = state
        .catalogue
        .list_domaines_newest()
        .await
        .map_err(Error::from)?;
    templates::page(
        "admin/domaines.html",
        context! {
            current_user => user,
            domaines => domaines,
        },
    )
}

#[get("/admin/domaines/new")]
pub async fn new_domaine_form(session: SessionContext) -> ApiResult<HttpResponse> {
    let user = session.require_admin()?;
    templates::page(
        "admin/domaine_form.html",
        context! {
            current_user => user,
            domaine => minijinja::Value::UNDEFINED,
            error => minijinja::Value::UNDEFINED,
        },
    )
}

#[post("/admin/domaines")]
pub async fn create_domaine(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<DomaineForm>,
) -> ApiResult<HttpResponse> {
    let user = session.require_admin()?;
    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(error) => {
            return templates::page_with_status(
                StatusCode::BAD_REQUEST,
                "admin/domaine_form.html",
                context! {
                    current_user => user,
                    domaine => &*form,
                    error => error.message(),
                },
            );
        }
    };
    state
        .admin
        .create_domaine(&draft)
        .await
        .map_err(Error::from)?;
    Ok(see_other("/admin/domaines"))
}

#[get("/admin/domaines/{id}/edit")]
pub async fn edit_domaine_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let user = session.require_admin()?;
    let id = DomaineId::new(path.into_inner());
    let domaine = state
        .admin
        .get_domaine(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("domaine not found"))?;
    templates::page(
        "admin/domaine_form.html",
        context! {
            current_user => user,
            domaine => domaine,
            error => minijinja::Value::UNDEFINED,
        },
    )
}

#[post("/admin/domaines/{id}")]
pub async fn update_domaine(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    form: web::Form<DomaineForm>,
) -> ApiResult<HttpResponse> {
    let user = session.require_admin()?;
    let id = DomaineId::new(path.into_inner());
    state
        .admin
        .get_domaine(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("domaine not found"))?;
    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(error) => {
            // Re-render with the id so the form still posts to the update URL.
            return templates::page_with_status(
                StatusCode::BAD_REQUEST,
                "admin/domaine_form.html",
                context! {
                    current_user => user,
                    domaine => context! {
                        id => id,
                        name => &form.name,
                        region => &form.region,
                        country => &form.country,
                    },
                    error => error.message(),
                },
            );
        }
    };
    state
        .admin
        .update_domaine(id, &draft)
        .await
        .map_err(Error::from)?;
    Ok(see_other("/admin/domaines"))
}

#[post("/admin/domaines/{id}/delete")]
pub async fn delete_domaine(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let id = DomaineId::new(path.into_inner());
    state
        .admin
        .delete_domaine(id)
        .await
        .map_err(Error::from)?;
    Ok(see_other("/admin/domaines"))
}

#[get("/admin/wines")]
pub async fn list_wines(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = session.require_admin()?;
    let wines = state
        .catalogue
        .list_wines(&crate::domain::WineFilter::default())
        .await
        .map_err(Error::from)?;
    templates::page(
        "admin/wines.html",
        context! {
            current_user => user,
            wines => wines,
        },
    )
}

#[get("/admin/wines/new")]
pub async fn new_wine_form(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = session.require_admin()?;
    let domaines = state
        .catalogue
        .list_domaines_by_name()
        .await
        .map_err(Error::from)?;
    templates::page(
        "admin/wine_form.html",
        context! {
            current_user => user,
            domaines => domaines,
            wine => minijinja::Value::UNDEFINED,
            error => minijinja::Value::UNDEFINED,
        },
    )
}

#[post("/admin/wines")]
pub async fn create_wine(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<WineForm>,
) -> ApiResult<HttpResponse> {
    let user = session.require_admin()?;
    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(error) => {
            let domaines = state
                .catalogue
                .list_domaines_by_name()
                .await
                .map_err(Error::from)?;
            return templates::page_with_status(
                StatusCode::BAD_REQUEST,
                "admin/wine_form.html",
                context! {
                    current_user => user,
                    domaines => domaines,
                    wine => &*form,
                    error => error.message(),
                },
            );
        }
    };
    state.admin.create_wine(&draft).await.map_err(Error::from)?;
    Ok(see_other("/admin/wines"))
}

#[get("/admin/wines/{id}/edit")]
pub async fn edit_wine_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let user = session.require_admin()?;
    let id = WineId::new(path.into_inner());
    let wine = state
        .admin
        .get_wine(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("wine not found"))?;
    let domaines = state
        .catalogue
        .list_domaines_by_name()
        .await
        .map_err(Error::from)?;
    templates::page(
        "admin/wine_form.html",
        context! {
            current_user => user,
            domaines => domaines,
            wine => wine,
            error => minijinja::Value::UNDEFINED,
        },
    )
}

#[post("/admin/wines/{id}")]
pub async fn update_wine(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    form: web::Form<WineForm>,
) -> ApiResult<HttpResponse> {
    let user = session.require_admin()?;
    let id = WineId::new(path.into_inner());
    state
        .admin
        .get_wine(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("wine not found"))?;
    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(error) => {
            let domaines = state
                .catalogue
                .list_domaines_by_name()
                .await
                .map_err(Error::from)?;
            return templates::page_with_status(
                StatusCode::BAD_REQUEST,
                "admin/wine_form.html",
                context! {
                    current_user => user,
                    domaines => domaines,
                    wine => context! {
                        id => id,
                        domaine_id => &form.domaine_id,
                        name => &form.name,
                        year => &form.year,
                        grape => &form.grape,
                        description_md => &form.description_md,
                    },
                    error => error.message(),
                },
            );
        }
    };
    state
        .admin
        .update_wine(id, &draft)
        .await
        .map_err(Error::from)?;
    Ok(see_other("/admin/wines"))
}

#[post("/admin/wines/{id}/delete")]
pub async fn delete_wine(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let id = WineId::new(path.into_inner());
    state.admin.delete_wine(id).await.map_err(Error::from)?;
    Ok(see_other("/admin/wines"))
}
