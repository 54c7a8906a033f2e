mod domain;
mod infrastructure;
mod interfaces;
pub mod constants;
pub mod errors;
pub mod graceful_shutdown;
pub mod settings;

pub use domain::{entities, use_cases};
pub use infrastructure::{content, delivery, limiter, utils};
pub use interfaces::{handlers, middlewares, routes};

use constants::{CONTACT_QUOTA_LIMIT, CONTACT_QUOTA_WINDOW};
use content::sanity::SanityStore;
use delivery::http::HttpDelivery;
use limiter::quota::InMemoryQuota;
use settings::AppConfig;
use use_cases::{contact::ContactHandler, content::ContentHandler};

pub type AppContactHandler = ContactHandler<HttpDelivery, InMemoryQuota>;
pub type AppContentHandler = ContentHandler<SanityStore>;

pub struct AppState {
    pub contact_handler: AppContactHandler,
    pub content_handler: AppContentHandler,
    pub studio_editor_url: Option<String>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let client = reqwest::Client::new();

        let quota = InMemoryQuota::new(CONTACT_QUOTA_WINDOW, CONTACT_QUOTA_LIMIT);
        let contact_handler = ContactHandler::new(
            HttpDelivery::new(client.clone()),
            quota,
            config.web3forms_access_key.clone(),
        );

        let content_handler = ContentHandler::new(SanityStore::new(client, config));

        AppState {
            contact_handler,
            content_handler,
            studio_editor_url: config.studio_editor_url.clone(),
        }
    }
}
