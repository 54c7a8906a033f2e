use std::collections::HashMap;

use actix_web::{get, web, HttpResponse, Responder};
use tracing::instrument;

use crate::{errors::AppError, AppState};

#[instrument(skip(state, query))]
#[get("/posts")]
pub async fn get_posts(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> Result<impl Responder, AppError> {
    let category = query.get("category").map(String::as_str);
    let featured_only = query.get("featured").map(String::as_str) == Some("true");

    let listing = state
        .content_handler
        .list_posts(category, featured_only)
        .await?;

    Ok(HttpResponse::Ok().json(listing))
}

#[instrument(skip(state))]
#[get("/posts/{slug}")]
pub async fn get_post_by_slug(
    slug: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let post = state.content_handler.get_post(&slug).await?;
    Ok(HttpResponse::Ok().json(post))
}

#[instrument(skip(state))]
#[get("/projects")]
pub async fn get_projects(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let index = state.content_handler.project_index().await?;
    Ok(HttpResponse::Ok().json(index))
}

#[instrument(skip(state))]
#[get("/projects/{slug}")]
pub async fn get_project_by_slug(
    slug: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let project = state.content_handler.get_project(&slug).await?;
    Ok(HttpResponse::Ok().json(project))
}
