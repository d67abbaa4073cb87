//! Review submission, deletion, and the "my reviews" page.
//!
//! Submitting twice for the same wine replaces the earlier review; the
//! one-review-per-user rule lives in the store's uniqueness constraint, so
//! these handlers never read-modify-write.

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use minijinja::context;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, ReviewId, WineId};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::templates;

#[derive(Debug, Deserialize, Serialize)]
pub struct ReviewForm {
    /// Kept as text so a non-integer submission maps to a validation error
    /// rather than a deserialisation failure.
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub comment: String,
}

fn back_to_wine(wine_id: WineId) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, format!("/wines/{wine_id}")))
        .finish()
}

#[post("/wines/{id}/review")]
pub async fn submit_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    form: web::Form<ReviewForm>,
) -> ApiResult<HttpResponse> {
    let user = session.require_login()?;
    let wine_id = WineId::new(path.into_inner());

    state
        .catalogue
        .wine_detail(wine_id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("wine not found"))?;

    let rating: i32 = form
        .rating
        .trim()
        .parse()
        .map_err(|_| Error::invalid_request("rating must be an integer between 1 and 5"))?;

    state
        .reviews
        .submit(wine_id, &user, rating, &form.comment)
        .await?;
    Ok(back_to_wine(wine_id))
}

#[post("/reviews/{id}/delete")]
pub async fn delete_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let user = session.require_login()?;
    let review_id = ReviewId::new(path.into_inner());
    let wine_id = state.reviews.delete(review_id, &user).await?;
    Ok(back_to_wine(wine_id))
}

#[get("/me/reviews")]
pub async fn my_reviews(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = session.require_login()?;
    let reviews = state
        .catalogue
        .reviews_by_user(user.id)
        .await
        .map_err(Error::from)?;

    templates::page(
        "my_reviews.html",
        context! {
            current_user => user,
            reviews => reviews,
        },
    )
}
