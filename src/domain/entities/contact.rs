use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Inbound contact form submission. Field presence is checked in the use
/// case so each failure mode gets its own error, not a deserializer message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,

    /// Delivery provider, defaults to the relay service when omitted.
    pub provider: Option<String>,

    #[serde(rename = "genericApiEndpoint")]
    pub generic_api_endpoint: Option<String>,

    #[serde(rename = "genericApiHeaders")]
    pub generic_api_headers: Option<HashMap<String, String>>,

    /// Anti-automation challenge token, required by the relay service.
    #[serde(rename = "h-captcha-response")]
    pub h_captcha_response: Option<String>,
}

/// Delivery providers the gate can dispatch to. Anything else on the wire is
/// rejected before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormProvider {
    Web3Forms,
    Generic,
}

impl Default for FormProvider {
    fn default() -> Self {
        FormProvider::Web3Forms
    }
}

impl FromStr for FormProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web3forms" => Ok(FormProvider::Web3Forms),
            "generic" => Ok(FormProvider::Generic),
            _ => Err(AppError::validation(
                "Invalid provider",
                "Invalid form provider specified.",
            )),
        }
    }
}

/// Normalized submission outcome handed back to the caller.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    pub data: serde_json::Value,
}
