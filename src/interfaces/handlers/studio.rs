use actix_web::{get, web, HttpResponse, Responder};

use crate::AppState;

/// Shell page behind the route access gate. The editor itself is hosted by
/// the CMS; this page embeds it when an editor URL is configured.
#[get("/studio")]
pub async fn studio_shell(state: web::Data<AppState>) -> impl Responder {
    let body = match &state.studio_editor_url {
        Some(url) => format!(
            r#"<!DOCTYPE html>
<html>
  <head>
    <title>Content Studio</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
      html, body {{ margin: 0; height: 100%; }}
      iframe {{ border: 0; width: 100%; height: 100%; }}
    </style>
  </head>
  <body>
    <iframe src="{url}" title="Content Studio"></iframe>
  </body>
</html>"#
        ),
        None => r#"<!DOCTYPE html>
<html>
  <head><title>Content Studio</title></head>
  <body>
    <h1>Content Studio</h1>
    <p>No hosted editor is configured. Set <code>studio_editor_url</code> to embed one.</p>
  </body>
</html>"#
            .to_string(),
    };

    HttpResponse::Ok()
        .insert_header(actix_web::http::header::ContentType::html())
        .body(body)
}
