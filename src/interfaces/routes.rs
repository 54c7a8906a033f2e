use actix_web::web;

use crate::{
    errors::AppError,
    handlers::{
        contact::submit_contact,
        content::{get_post_by_slug, get_posts, get_project_by_slug, get_projects},
        home::home,
        studio::studio_shell,
        system::health_check,
    },
};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // A body that fails to parse gets the same envelope as every other
    // validation failure, not the extractor's plaintext default.
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::validation("Invalid JSON body", err.to_string()).into()
    }));

    cfg.service(home);
    cfg.service(health_check);
    cfg.service(studio_shell);

    cfg.service(
        web::scope("/api")
            .service(submit_contact)
            .service(get_posts)
            .service(get_post_by_slug)
            .service(get_projects)
            .service(get_project_by_slug),
    );
}
