use actix_web::{
    body::BoxBody,
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::ContentType,
    Error, HttpResponse,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::{infrastructure::utils::client_ip::client_ip, settings::AppConfig};

pub const STUDIO_PREFIX: &str = "/studio";
const AUTH_COOKIE: &str = "studio-auth";
const COOKIE_MAX_AGE_DAYS: i64 = 7;

/// Gate configuration. The three protection strategies are mutually
/// exclusive: the first configured one decides and the rest are ignored.
#[derive(Debug, Clone, Default)]
pub struct StudioGateConfig {
    pub password: Option<String>,
    pub allowed_ips: Option<Vec<String>>,
    pub dev_only: bool,
    pub production: bool,
}

impl From<&AppConfig> for StudioGateConfig {
    fn from(config: &AppConfig) -> Self {
        StudioGateConfig {
            password: config.studio_password.clone(),
            allowed_ips: config.studio_allowed_ips(),
            dev_only: config.studio_dev_only,
            production: config.is_production(),
        }
    }
}

/// What the gate decided for one request.
#[derive(Debug)]
enum GateDecision {
    Pass,
    /// Pass and issue the acknowledgment cookie on the way out.
    PassWithCookie(Cookie<'static>),
    /// Render the credential form; `wrong_attempt` adds the inline error.
    Challenge { wrong_attempt: bool },
    Deny(&'static str),
}

#[derive(Debug, Clone, Copy)]
enum Strategy {
    SharedSecret,
    IpAllowList,
    DevOnly,
}

/// Evaluation order. The gate stops at the first strategy that is
/// configured; adding a strategy means adding a variant and a slot here.
const STRATEGIES: [Strategy; 3] = [Strategy::SharedSecret, Strategy::IpAllowList, Strategy::DevOnly];

impl Strategy {
    /// `None` when this strategy is not configured and the next one should
    /// be consulted.
    fn evaluate(self, config: &StudioGateConfig, req: &ServiceRequest) -> Option<GateDecision> {
        match self {
            Strategy::SharedSecret => {
                let secret = config.password.as_deref()?;
                Some(evaluate_shared_secret(secret, req, config.production))
            }
            Strategy::IpAllowList => {
                let allowed = config.allowed_ips.as_deref()?;
                let client = client_ip(req.headers());
                if allowed.iter().any(|ip| ip == &client) {
                    Some(GateDecision::Pass)
                } else {
                    Some(GateDecision::Deny("Access Denied"))
                }
            }
            Strategy::DevOnly => {
                if !config.dev_only {
                    return None;
                }
                if config.production {
                    Some(GateDecision::Deny("Studio not available in production"))
                } else {
                    Some(GateDecision::Pass)
                }
            }
        }
    }
}

fn evaluate_shared_secret(
    secret: &str,
    req: &ServiceRequest,
    production: bool,
) -> GateDecision {
    let url_password = query_param(req.query_string(), "password");

    // A correct parameter wins and earns the acknowledgment cookie. The
    // cookie is only trusted while its value equals the current secret, so
    // rotating the secret invalidates every outstanding cookie.
    if url_password.as_deref() == Some(secret) {
        return GateDecision::PassWithCookie(build_auth_cookie(secret, production));
    }

    if req
        .cookie(AUTH_COOKIE)
        .is_some_and(|cookie| cookie.value() == secret)
    {
        return GateDecision::Pass;
    }

    GateDecision::Challenge {
        wrong_attempt: url_password.is_some(),
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn build_auth_cookie(secret: &str, production: bool) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, secret.to_string())
        .path("/")
        .max_age(CookieDuration::days(COOKIE_MAX_AGE_DAYS))
        .http_only(true)
        .secure(production)
        .same_site(SameSite::Lax)
        .finish()
}

/// Self-contained credential form. The secret travels back as a GET query
/// parameter, exactly as the deployed contract expects; see DESIGN.md for
/// why this is kept despite the hygiene concern.
fn challenge_page(wrong_attempt: bool) -> String {
    let error_block = if wrong_attempt {
        r#"<p class="error">Invalid password. Please try again.</p>"#
    } else {
        ""
    };
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <title>Studio Access</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
      body {{
        font-family: system-ui, -apple-system, sans-serif;
        display: flex;
        align-items: center;
        justify-content: center;
        min-height: 100vh;
        background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
        margin: 0;
      }}
      .container {{
        background: white;
        padding: 2rem;
        border-radius: 8px;
        box-shadow: 0 10px 25px rgba(0,0,0,0.2);
        max-width: 400px;
        width: 100%;
      }}
      h1 {{ margin: 0 0 1rem 0; color: #333; }}
      input {{
        width: 100%;
        padding: 0.75rem;
        border: 1px solid {input_border};
        border-radius: 4px;
        font-size: 1rem;
        box-sizing: border-box;
        margin-bottom: 0.5rem;
      }}
      button {{
        width: 100%;
        padding: 0.75rem;
        background: #667eea;
        color: white;
        border: none;
        border-radius: 4px;
        font-size: 1rem;
        cursor: pointer;
      }}
      button:hover {{ background: #5568d3; }}
      .error {{ color: #e74c3c; font-size: 0.875rem; margin: 0 0 1rem 0; }}
    </style>
  </head>
  <body>
    <div class="container">
      <h1>Studio Access Required</h1>
      {error_block}
      <form method="GET">
        <input type="password" name="password" placeholder="Enter password" required autofocus />
        <button type="submit">Access Studio</button>
      </form>
    </div>
  </body>
</html>"#,
        input_border = if wrong_attempt { "#e74c3c" } else { "#ddd" },
    )
}

pub struct StudioGate {
    config: Rc<StudioGateConfig>,
}

impl StudioGate {
    pub fn new(config: StudioGateConfig) -> Self {
        StudioGate {
            config: Rc::new(config),
        }
    }
}

impl<S> Transform<S, ServiceRequest> for StudioGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = StudioGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(StudioGateService {
            service: Rc::new(service),
            config: Rc::clone(&self.config),
        })
    }
}

pub struct StudioGateService<S> {
    service: Rc<S>,
    config: Rc<StudioGateConfig>,
}

impl<S> Service<ServiceRequest> for StudioGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let config = Rc::clone(&self.config);

        Box::pin(async move {
            if !req.path().starts_with(STUDIO_PREFIX) {
                return service.call(req).await;
            }

            let decision = STRATEGIES
                .iter()
                .find_map(|strategy| strategy.evaluate(&config, &req))
                .unwrap_or(GateDecision::Pass);

            match decision {
                GateDecision::Pass => service.call(req).await,
                GateDecision::PassWithCookie(cookie) => {
                    let mut res = service.call(req).await?;
                    res.response_mut().add_cookie(&cookie)?;
                    Ok(res)
                }
                GateDecision::Challenge { wrong_attempt } => {
                    if wrong_attempt {
                        tracing::warn!(path = req.path(), "wrong studio password attempt");
                    }
                    let response = HttpResponse::Unauthorized()
                        .insert_header(ContentType::html())
                        .body(challenge_page(wrong_attempt));
                    Ok(req.into_response(response))
                }
                GateDecision::Deny(reason) => {
                    tracing::warn!(path = req.path(), reason, "studio access denied");
                    let response = HttpResponse::Forbidden()
                        .insert_header(ContentType::plaintext())
                        .body(reason);
                    Ok(req.into_response(response))
                }
            }
        })
    }
}
