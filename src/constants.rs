use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Contact form quota: 5 accepted submissions per 15 minutes per client key.
pub const CONTACT_QUOTA_WINDOW: Duration = Duration::from_secs(15 * 60);
pub const CONTACT_QUOTA_LIMIT: u32 = 5;

pub const MAX_MESSAGE_LENGTH: usize = 5000;

pub const WEB3FORMS_ENDPOINT: &str = "https://api.web3forms.com/submit";
