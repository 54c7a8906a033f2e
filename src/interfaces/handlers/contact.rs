use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::contact::ContactForm, errors::AppError,
    infrastructure::utils::client_ip::client_ip, AppState,
};

#[instrument(skip(req, state, form))]
#[post("/contact")]
pub async fn submit_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Json<ContactForm>,
) -> Result<impl Responder, AppError> {
    let client_key = client_ip(req.headers());

    let response = state
        .contact_handler
        .submit(&form.into_inner(), &client_key)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}
